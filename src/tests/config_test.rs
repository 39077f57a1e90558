#[cfg(test)]
mod tests {
    use crate::config::AppConfig;

    #[test]
    fn rejects_empty_bind_address() {
        let mut config = AppConfig {
            bind_address: String::new(),
            ros_distro: "humble".into(),
            event_queue_capacity: 1024,
            monitor_interval_secs: 3,
            default_launch_timeout_secs: 5,
            default_grace_timeout_secs: 5,
            verbose: true,
        };
        assert!(config.validate().is_err());
        config.bind_address = "0.0.0.0:8080".into();
        assert!(config.validate().is_ok());
    }
}
