use super::process::Program;
use crate::domain::HostEnvironment;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn is_command_available(&self, cmd: &str) -> bool {
        Program::new(cmd).is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_is_unavailable() {
        assert!(!SystemHost.is_command_available("ecsdeploy-no-such-tool"));
    }
}
