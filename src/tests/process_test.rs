#[cfg(test)]
mod tests {
    use crate::process::is_pid_active;

    #[test]
    fn self_pid_is_active() {
        let pid = std::process::id() as i32;
        assert!(is_pid_active(pid));
    }

    #[test]
    fn bogus_pid_is_not_active() {
        // A PID this high is very unlikely to be assigned.
        assert!(!is_pid_active(i32::MAX - 1));
    }
}
