#[cfg(test)]
mod tests {
    use crate::events::{EventKind, EventQueue, NodeEvent};

    #[tokio::test]
    async fn drain_returns_only_whats_queued() {
        let queue = EventQueue::new(4);
        queue.push(NodeEvent::status("a")).await.unwrap();
        queue.push(NodeEvent::status("b")).await.unwrap();

        let first = queue.drain().await.unwrap();
        assert_eq!(first.len(), 2);

        let second = queue.drain().await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn overflow_drops_oldest_and_warns_once() {
        let queue = EventQueue::new(2);
        queue.push(NodeEvent::status("1")).await.unwrap();
        queue.push(NodeEvent::status("2")).await.unwrap();
        queue.push(NodeEvent::status("3")).await.unwrap(); // drops "1", appends a warning

        let items = queue.drain().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].message, "3");
        assert_eq!(items[1].kind, EventKind::Warning);
    }
}
