//! Protobuf types and gRPC service for the plugin protocol.
//!
//! Generated at build time from `proto/provider.proto`.

include!(concat!(env!("OUT_DIR"), "/plugin.v1.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proto_types_accessible() {
        let _ = Diagnostic::default();
        let _ = Schema::default();
        let _ = AttributeChange::default();
        let _ = ServerCapabilities::default();
        let _ = PlanRequest::default();
    }

    #[test]
    fn test_severity_values() {
        assert_eq!(diagnostic::Severity::Invalid as i32, 0);
        assert_eq!(diagnostic::Severity::Error as i32, 1);
        assert_eq!(diagnostic::Severity::Warning as i32, 2);
    }
}
