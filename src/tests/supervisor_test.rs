#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::errors::SupervisorError;
    use crate::supervisor::Supervisor;

    fn test_config() -> AppConfig {
        AppConfig {
            bind_address: "127.0.0.1:0".into(),
            ros_distro: "humble".into(),
            event_queue_capacity: 64,
            monitor_interval_secs: 3600,
            default_launch_timeout_secs: 1,
            default_grace_timeout_secs: 1,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn list_is_empty_for_a_fresh_supervisor() {
        let supervisor = Supervisor::new(test_config());
        assert!(supervisor.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_events_on_unknown_node_is_not_found() {
        let supervisor = Supervisor::new(test_config());
        let err = supervisor.get_events("ghost").await.unwrap_err();
        assert!(matches!(err, SupervisorError::NodeNotFound(_)));
    }

    #[tokio::test]
    async fn terminate_on_unknown_node_is_a_silent_no_op() {
        let supervisor = Supervisor::new(test_config());
        supervisor.terminate("ghost", None).await;
    }
}
