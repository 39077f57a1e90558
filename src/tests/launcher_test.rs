#[cfg(test)]
mod tests {
    use crate::errors::SupervisorError;
    use crate::launcher::{build_argv, NodeRequest};
    use std::collections::HashMap;

    #[test]
    fn rejects_both_executable_and_launch_file() {
        let req = NodeRequest {
            name: "b".into(),
            package: "p".into(),
            executable: Some("x".into()),
            launch_file: Some("l".into()),
            ..Default::default()
        };
        assert!(matches!(
            build_argv(&req),
            Err(SupervisorError::InvalidRequest(_))
        ));
    }

    #[test]
    fn rejects_neither_executable_nor_launch_file() {
        let req = NodeRequest {
            name: "b".into(),
            package: "p".into(),
            ..Default::default()
        };
        assert!(matches!(
            build_argv(&req),
            Err(SupervisorError::InvalidRequest(_))
        ));
    }

    #[test]
    fn empty_parameter_value_renders_trailing_colon_equals() {
        let mut parameters = HashMap::new();
        parameters.insert("k".to_string(), "".to_string());
        let req = NodeRequest {
            name: "a".into(),
            package: "p".into(),
            executable: Some("x".into()),
            parameters,
            ..Default::default()
        };
        let (argv, is_launch_tree) = build_argv(&req).unwrap();
        assert!(!is_launch_tree);
        assert_eq!(argv, vec!["ros2", "run", "p", "x", "--ros-args", "-p", "k:="]);
    }

    #[test]
    fn multiple_parameters_each_get_their_own_ros_args_flag() {
        let mut parameters = HashMap::new();
        parameters.insert("a".to_string(), "1".to_string());
        parameters.insert("b".to_string(), "2".to_string());
        let req = NodeRequest {
            name: "n".into(),
            package: "p".into(),
            executable: Some("x".into()),
            parameters,
            ..Default::default()
        };
        let (argv, _) = build_argv(&req).unwrap();

        // Fixed argv prefix, then repeated [--ros-args, -p, k:=v] triples
        // (triple order is HashMap-dependent, each triple must stay intact).
        assert_eq!(&argv[..4], &["ros2", "run", "p", "x"]);
        let rest = &argv[4..];
        assert_eq!(rest.len(), 6);
        for triple in rest.chunks(3) {
            assert_eq!(triple[0], "--ros-args");
            assert_eq!(triple[1], "-p");
            assert!(triple[2] == "a:=1" || triple[2] == "b:=2");
        }
    }
}
