mod alerts;
mod health_logs;
mod reminders;
