//! "Add to Home Screen" prompt.
//!
//! Chromium browsers fire `beforeinstallprompt`, which the page defers and
//! replays from its own button. iOS has no such event, so the page shows
//! manual instructions instead. Nothing is shown once the app runs
//! standalone.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ClientError;

pub const INSTALL_LABEL: &str = "Add to Home Screen";
pub const INSTALLING_LABEL: &str = "Installing...";

const IOS_DEVICES: [&str; 3] = ["iPad", "iPhone", "iPod"];

/// `userChoice.outcome` of a deferred prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

/// The event captured from `beforeinstallprompt` after `preventDefault()`.
#[async_trait]
pub trait DeferredInstallPrompt: Send + Sync {
    /// Shows the browser dialog and resolves with the user's choice.
    async fn prompt(&self) -> Result<InstallOutcome, ClientError>;
}

pub trait InstallEnvironment: Send + Sync {
    fn user_agent(&self) -> String;
    /// IE11 sets `window.MSStream` and claims to be an iPhone.
    fn has_ms_stream(&self) -> bool;
    /// `(display-mode: standalone)` matches.
    fn is_standalone(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallView {
    Hidden,
    IosInstructions,
    InstallButton,
}

pub struct InstallPromptController {
    is_ios: bool,
    is_standalone: bool,
    deferred_prompt: Option<Arc<dyn DeferredInstallPrompt>>,
    show_install_prompt: bool,
    is_installing: bool,
}

impl InstallPromptController {
    pub fn new(environment: &dyn InstallEnvironment) -> Self {
        let user_agent = environment.user_agent();
        let is_ios = IOS_DEVICES.iter().any(|device| user_agent.contains(device))
            && !environment.has_ms_stream();

        Self {
            is_ios,
            is_standalone: environment.is_standalone(),
            deferred_prompt: None,
            show_install_prompt: false,
            is_installing: false,
        }
    }

    pub fn is_ios(&self) -> bool {
        self.is_ios
    }

    pub fn is_installing(&self) -> bool {
        self.is_installing
    }

    pub fn button_label(&self) -> &'static str {
        if self.is_installing {
            INSTALLING_LABEL
        } else {
            INSTALL_LABEL
        }
    }

    pub fn view(&self) -> InstallView {
        if self.is_standalone {
            InstallView::Hidden
        } else if self.is_ios {
            InstallView::IosInstructions
        } else if self.show_install_prompt {
            InstallView::InstallButton
        } else {
            InstallView::Hidden
        }
    }

    pub fn on_before_install_prompt(&mut self, prompt: Arc<dyn DeferredInstallPrompt>) {
        tracing::debug!("beforeinstallprompt fired");
        self.deferred_prompt = Some(prompt);
        self.show_install_prompt = true;
    }

    pub fn on_app_installed(&mut self) {
        tracing::info!("App was installed");
        self.deferred_prompt = None;
        self.show_install_prompt = false;
        self.is_standalone = true;
    }

    /// Replays the deferred prompt. Returns `None` when there was nothing to
    /// replay or the prompt failed; a failed prompt stays deferred.
    pub async fn install(&mut self) -> Option<InstallOutcome> {
        if self.is_ios || self.is_installing {
            return None;
        }
        let Some(prompt) = self.deferred_prompt.clone() else {
            tracing::debug!("No deferred install prompt available");
            return None;
        };

        self.is_installing = true;
        let outcome = match prompt.prompt().await {
            Ok(outcome) => {
                tracing::info!("Install prompt answered: {:?}", outcome);
                self.deferred_prompt = None;
                self.show_install_prompt = false;
                Some(outcome)
            }
            Err(e) => {
                tracing::error!("Install prompt failed: {}", e);
                None
            }
        };
        self.is_installing = false;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) Chrome/126.0 Mobile";
    const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) Safari/604.1";

    struct FakeEnvironment {
        user_agent: &'static str,
        ms_stream: bool,
        standalone: bool,
    }

    impl FakeEnvironment {
        fn browser(user_agent: &'static str) -> Self {
            Self {
                user_agent,
                ms_stream: false,
                standalone: false,
            }
        }
    }

    impl InstallEnvironment for FakeEnvironment {
        fn user_agent(&self) -> String {
            self.user_agent.to_string()
        }

        fn has_ms_stream(&self) -> bool {
            self.ms_stream
        }

        fn is_standalone(&self) -> bool {
            self.standalone
        }
    }

    struct FakePrompt {
        answer: Option<InstallOutcome>,
        calls: Mutex<usize>,
    }

    impl FakePrompt {
        fn answering(answer: Option<InstallOutcome>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl DeferredInstallPrompt for FakePrompt {
        async fn prompt(&self) -> Result<InstallOutcome, ClientError> {
            *self.calls.lock().unwrap() += 1;
            self.answer
                .ok_or_else(|| ClientError::Platform("NotAllowedError".to_string()))
        }
    }

    #[test]
    fn hidden_until_browser_offers_install() {
        let mut controller = InstallPromptController::new(&FakeEnvironment::browser(ANDROID_UA));
        assert_eq!(controller.view(), InstallView::Hidden);

        controller.on_before_install_prompt(FakePrompt::answering(None));

        assert_eq!(controller.view(), InstallView::InstallButton);
        assert_eq!(controller.button_label(), INSTALL_LABEL);
    }

    #[tokio::test]
    async fn accepted_prompt_is_used_once() {
        let prompt = FakePrompt::answering(Some(InstallOutcome::Accepted));
        let mut controller = InstallPromptController::new(&FakeEnvironment::browser(ANDROID_UA));
        controller.on_before_install_prompt(prompt.clone());

        assert_eq!(controller.install().await, Some(InstallOutcome::Accepted));
        assert_eq!(controller.view(), InstallView::Hidden);
        assert!(!controller.is_installing());

        assert_eq!(controller.install().await, None);
        assert_eq!(*prompt.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn dismissed_prompt_also_hides() {
        let mut controller = InstallPromptController::new(&FakeEnvironment::browser(ANDROID_UA));
        controller.on_before_install_prompt(FakePrompt::answering(Some(InstallOutcome::Dismissed)));

        assert_eq!(controller.install().await, Some(InstallOutcome::Dismissed));
        assert_eq!(controller.view(), InstallView::Hidden);
    }

    #[tokio::test]
    async fn failed_prompt_stays_available() {
        let prompt = FakePrompt::answering(None);
        let mut controller = InstallPromptController::new(&FakeEnvironment::browser(ANDROID_UA));
        controller.on_before_install_prompt(prompt.clone());

        assert_eq!(controller.install().await, None);

        assert!(!controller.is_installing());
        assert_eq!(controller.view(), InstallView::InstallButton);
        assert_eq!(*prompt.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn ios_shows_instructions_and_never_prompts() {
        let prompt = FakePrompt::answering(Some(InstallOutcome::Accepted));
        let mut controller = InstallPromptController::new(&FakeEnvironment::browser(IPHONE_UA));
        controller.on_before_install_prompt(prompt.clone());

        assert!(controller.is_ios());
        assert_eq!(controller.view(), InstallView::IosInstructions);
        assert_eq!(controller.install().await, None);
        assert_eq!(*prompt.calls.lock().unwrap(), 0);
    }

    #[test]
    fn ms_stream_is_not_ios() {
        let controller = InstallPromptController::new(&FakeEnvironment {
            ms_stream: true,
            ..FakeEnvironment::browser(IPHONE_UA)
        });

        assert!(!controller.is_ios());
        assert_eq!(controller.view(), InstallView::Hidden);
    }

    #[test]
    fn standalone_hides_everything() {
        let mut controller = InstallPromptController::new(&FakeEnvironment {
            standalone: true,
            ..FakeEnvironment::browser(IPHONE_UA)
        });
        assert_eq!(controller.view(), InstallView::Hidden);

        controller.on_before_install_prompt(FakePrompt::answering(None));
        assert_eq!(controller.view(), InstallView::Hidden);
    }

    #[tokio::test]
    async fn app_installed_drops_deferred_prompt() {
        let prompt = FakePrompt::answering(Some(InstallOutcome::Accepted));
        let mut controller = InstallPromptController::new(&FakeEnvironment::browser(ANDROID_UA));
        controller.on_before_install_prompt(prompt.clone());

        controller.on_app_installed();

        assert_eq!(controller.view(), InstallView::Hidden);
        assert_eq!(controller.install().await, None);
        assert_eq!(*prompt.calls.lock().unwrap(), 0);
    }

    #[test]
    fn outcome_reads_user_choice_strings() {
        let outcome: InstallOutcome = serde_json::from_str(r#""dismissed""#).unwrap();
        assert_eq!(outcome, InstallOutcome::Dismissed);
    }
}
