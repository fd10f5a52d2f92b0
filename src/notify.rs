//! Notification sinks. Delivery is fire-and-forget: failures are logged here
//! and never reach the tick loop.

use std::sync::Arc;

use tokio::process::Command;

use crate::settings::NotifierSettings;

pub trait Notifier: Send + Sync {
    fn speak(&self, text: &str, lang: &str);
}

pub fn from_settings(settings: &NotifierSettings) -> Arc<dyn Notifier> {
    match settings {
        NotifierSettings::Log => Arc::new(LogNotifier),
        NotifierSettings::Command { program, args } => {
            Arc::new(CommandNotifier::new(program.clone(), args.clone()))
        }
    }
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn speak(&self, text: &str, lang: &str) {
        log::info!("[speak:{lang}] {text}");
    }
}

/// Runs a text-to-speech program per notification without waiting for it.
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }

    fn render_args(&self, text: &str, lang: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace("{text}", text).replace("{lang}", lang))
            .collect()
    }
}

impl Notifier for CommandNotifier {
    fn speak(&self, text: &str, lang: &str) {
        log::info!("[speak:{lang}] {text}");

        let mut command = Command::new(&self.program);
        command.args(self.render_args(text, lang)).kill_on_drop(false);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                log::warn!("Failed to spawn notifier '{}': {err}", self.program);
                return;
            }
        };

        let program = self.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    log::warn!("Notifier '{program}' exited with {status}");
                }
                Ok(_) => {}
                Err(err) => log::warn!("Failed to wait for notifier '{program}': {err}"),
            }
        });
    }
}
