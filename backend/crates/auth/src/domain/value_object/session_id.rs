pub use kernel::id::SessionId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_new() {
        let session_id = SessionId::new();
        assert_eq!(session_id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_regenerated_ids_differ() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
