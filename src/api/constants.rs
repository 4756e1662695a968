//! API constants and endpoint builders for the DocuWare Platform API

use urlencoding::encode;

/// Safety margin subtracted from a token's declared lifetime, in seconds.
pub const TOKEN_EXPIRY_SKEW_SECS: u64 = 30;

/// Minimum effective token lifetime in seconds, applied before the skew.
/// Some identity servers declare very short lifetimes.
pub const TOKEN_LIFETIME_FLOOR_SECS: u64 = 60;

/// Maximum effective token lifetime in seconds (24h). Caps nonsense
/// `expires_in` values so expiry arithmetic cannot overflow.
pub const TOKEN_LIFETIME_CEILING_SECS: u64 = 86_400;

/// Scope requested on password-grant login when none is configured.
pub const DEFAULT_SCOPE: &str = "docuware.platform dwprofile openid offline_access";

/// Default page size when listing documents.
pub const DEFAULT_DOCUMENT_COUNT: u32 = 50;

/// Document listing pages are 1-indexed.
pub const DEFAULT_DOCUMENT_PAGE: u32 = 1;

/// Standard headers for Platform requests
pub mod headers {
    /// Accept value for JSON responses
    pub const ACCEPT_JSON: &str = "application/json";

    /// Accept value for XML responses (the Platform default)
    pub const ACCEPT_XML: &str = "application/xml";
}

/// Build the identity server token endpoint URL
pub fn token_endpoint(identity_url: &str) -> String {
    format!("{}/connect/token", identity_url)
}

/// Build the file cabinet listing endpoint URL
pub fn file_cabinets_endpoint(base_url: &str) -> String {
    format!("{}/FileCabinets", base_url)
}

/// Build the document listing endpoint URL for a cabinet
pub fn documents_endpoint(base_url: &str, cabinet_id: &str) -> String {
    format!("{}/FileCabinets/{}/Documents", base_url, encode(cabinet_id))
}

/// Build the document field listing endpoint URL
pub fn document_fields_endpoint(base_url: &str, cabinet_id: &str, doc_id: &str) -> String {
    format!(
        "{}/FileCabinets/{}/Documents/{}/Fields",
        base_url,
        encode(cabinet_id),
        encode(doc_id)
    )
}

/// Ordered candidate endpoints for document content. Different server
/// versions expose the file under different paths; callers try each in
/// order and treat 404 as "try the next one".
pub fn file_candidate_endpoints(base_url: &str, cabinet_id: &str, doc_id: &str) -> Vec<String> {
    let cabinet = encode(cabinet_id).into_owned();
    let doc = encode(doc_id).into_owned();
    vec![
        format!("{}/FileCabinets/{}/Documents/{}/File", base_url, cabinet, doc),
        format!("{}/Documents/{}/File", base_url, doc),
        format!(
            "{}/FileCabinets/{}/Documents/{}/Sections/0/File",
            base_url, cabinet, doc
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_builders() {
        let base = "https://host/DocuWare/Platform";
        assert_eq!(
            file_cabinets_endpoint(base),
            "https://host/DocuWare/Platform/FileCabinets"
        );
        assert_eq!(
            documents_endpoint(base, "fc-1"),
            "https://host/DocuWare/Platform/FileCabinets/fc-1/Documents"
        );
        assert_eq!(
            document_fields_endpoint(base, "fc-1", "42"),
            "https://host/DocuWare/Platform/FileCabinets/fc-1/Documents/42/Fields"
        );
    }

    #[test]
    fn test_file_candidates_are_ordered() {
        let candidates = file_candidate_endpoints("https://h/p", "cab", "7");
        assert_eq!(
            candidates,
            vec![
                "https://h/p/FileCabinets/cab/Documents/7/File",
                "https://h/p/Documents/7/File",
                "https://h/p/FileCabinets/cab/Documents/7/Sections/0/File",
            ]
        );
    }

    #[test]
    fn test_ids_are_path_encoded() {
        let url = documents_endpoint("https://h/p", "a b/c");
        assert_eq!(url, "https://h/p/FileCabinets/a%20b%2Fc/Documents");
    }
}
