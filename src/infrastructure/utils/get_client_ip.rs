use actix_web::{http::header::HeaderMap, HttpRequest};

pub const UNKNOWN_CLIENT_IP: &str = "unknown";

/// Source address of the request, following proxy headers:
/// first `x-forwarded-for` entry, then `cf-connecting-ip`, else `"unknown"`.
pub fn get_client_ip(req: &HttpRequest) -> String {
    client_ip_from_headers(req.headers())
}

pub fn client_ip_from_headers(headers: &HeaderMap) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            header_str(headers, "cf-connecting-ip")
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
        })
        .unwrap_or(UNKNOWN_CLIENT_IP)
        .to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn uses_first_forwarded_for_entry() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"))
            .insert_header(("cf-connecting-ip", "198.51.100.2"))
            .to_http_request();

        assert_eq!(get_client_ip(&req), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_connecting_ip_header() {
        let req = TestRequest::default()
            .insert_header(("cf-connecting-ip", "198.51.100.2"))
            .to_http_request();

        assert_eq!(get_client_ip(&req), "198.51.100.2");
    }

    #[test]
    fn blank_forwarded_for_is_ignored() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", ""))
            .insert_header(("cf-connecting-ip", "198.51.100.2"))
            .to_http_request();

        assert_eq!(get_client_ip(&req), "198.51.100.2");
    }

    #[test]
    fn unknown_without_headers() {
        let req = TestRequest::default().to_http_request();

        assert_eq!(get_client_ip(&req), UNKNOWN_CLIENT_IP);
    }
}
