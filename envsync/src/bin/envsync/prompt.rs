use dialoguer::Confirm;
use envsync::ConfirmPrompt;

/// Interactive yes/no prompt on the controlling terminal. Defaults to
/// "no", and treats an unusable terminal the same as a decline so a
/// non-interactive run can never destroy anything.
pub struct TerminalPrompt;

impl ConfirmPrompt for TerminalPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
