#[cfg(test)]
mod tests {
    use crate::capture::{frame_chunk, StreamState};

    #[test]
    fn frames_complete_lines_and_keeps_trailing_partial() {
        let mut state = StreamState::new();
        let (lines, replaced) = frame_chunk(&mut state, b"one\ntwo\nthre");
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
        assert!(!replaced);
        assert_eq!(state.partial, "thre");
    }

    #[test]
    fn drops_empty_lines() {
        let mut state = StreamState::new();
        let (lines, _) = frame_chunk(&mut state, b"\n\nhello\n");
        assert_eq!(lines, vec!["hello".to_string()]);
    }

    #[test]
    fn invalid_utf8_is_replaced_and_flagged() {
        let mut state = StreamState::new();
        let (_, replaced) = frame_chunk(&mut state, &[0xff, 0xfe, b'\n']);
        assert!(replaced);
    }
}
