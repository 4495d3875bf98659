use crate::orchestrator::{Failure, FailureKind};

/// What the error screen shows for a failure
pub struct ErrorInfo {
    pub(crate) kind: FailureKind,
    pub(crate) headline: &'static str,
    pub(crate) hint: &'static str,
    pub(crate) details: String,
}

impl ErrorInfo {
    pub fn from_failure(failure: &Failure) -> Self {
        let (headline, hint) = match failure.kind {
            FailureKind::Resources => (
                "Could not load the boot images",
                "Check the bootloader and disk paths in the configuration, then restart.",
            ),
            FailureKind::Machine => (
                "The machine stopped",
                "The core reported a fault and will not run again until restarted.",
            ),
            FailureKind::Harness => (
                "The harness stopped",
                "An internal thread went away; the log has more.",
            ),
        };
        Self {
            kind: failure.kind,
            headline,
            hint,
            details: failure.reason.clone(),
        }
    }

    /// Plain text for the clipboard
    pub fn report(&self) -> String {
        format!("{} ({:?})\n\n{}", self.headline, self.kind, self.details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_machine_failures_read_differently() {
        let load = ErrorInfo::from_failure(&Failure::new(
            FailureKind::Resources,
            "could not fetch disk.img",
        ));
        let machine = ErrorInfo::from_failure(&Failure::new(FailureKind::Machine, "bad opcode"));

        assert_ne!(load.headline, machine.headline);
        assert_eq!(load.details, "could not fetch disk.img");
        assert!(machine.report().contains("bad opcode"));
        assert!(machine.report().starts_with("The machine stopped (Machine)"));
    }
}
