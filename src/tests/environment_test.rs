#[cfg(test)]
mod tests {
    use crate::environment::{overlay_dump, resolve};
    use crate::errors::SupervisorError;
    use std::collections::HashMap;

    #[test]
    fn overlay_handles_empty_values_and_sourced_wins() {
        let mut env = HashMap::new();
        env.insert("HOME".to_string(), "/home/host".to_string());
        env.insert("ROS_DISTRO".to_string(), "".to_string());

        overlay_dump(&mut env, "HOME=/home/sourced\nROS_DISTRO=humble\nNO_EQUALS_SIGN\n");

        assert_eq!(env.get("HOME").unwrap(), "/home/sourced");
        assert_eq!(env.get("ROS_DISTRO").unwrap(), "humble");
        assert!(!env.contains_key("NO_EQUALS_SIGN"));
    }

    #[tokio::test]
    async fn missing_distro_setup_script_is_a_launch_error() {
        // `&&` means a nonexistent setup.bash must abort the whole shell
        // invocation instead of silently falling through to a successful `env`.
        let base = HashMap::new();
        let err = resolve("not-a-real-distro", &base).await.unwrap_err();
        assert!(matches!(err, SupervisorError::LaunchFailed(_)));
    }
}
