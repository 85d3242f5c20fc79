//! Downloads page module
//!
//! The page body is a constant: a table listing the available build with a
//! download link, plus a pointer to the source repository. It is prepared
//! once at startup (body bytes + `ETag`) and served unchanged for the life
//! of the process.

use crate::http::{self, cache};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// The fixed downloads document, served byte-for-byte on every request
pub const DOWNLOADS_PAGE: &str = "<html>
<body>
download the latest build at:
<table>
<tr>
<th>os</th>
<th>download link</th>
</tr>
<tr>
<td>linux amd64</td>
<td><a href='https://go-lanscan.appspot.com/go-lanscan'>https://go-lanscan.appspot.com/go-lanscan</a></td>
</tr>
</table>
Source code at <a href='https://bitbucket.org/johnpfeiffer/go-lanscan'>https://bitbucket.org/johnpfeiffer/go-lanscan</a>
</body>
</html>
";

/// Downloads page prepared for serving: static body plus precomputed `ETag`
pub struct DownloadsPage {
    body: Bytes,
    etag: String,
}

impl DownloadsPage {
    /// Prepare the page once at startup
    pub fn prepare() -> Self {
        let body = Bytes::from_static(DOWNLOADS_PAGE.as_bytes());
        let etag = cache::generate_etag(&body);
        Self { body, etag }
    }

    /// Build the response for a `GET /` or `HEAD /` request
    ///
    /// Answers 304 when the client's `If-None-Match` matches the page `ETag`,
    /// the full document otherwise. `Bytes` clones are reference-counted, so
    /// no copy of the body is made per request.
    pub fn respond(
        &self,
        if_none_match: Option<&str>,
        is_head: bool,
        server_name: &str,
    ) -> Response<Full<Bytes>> {
        if cache::check_etag_match(if_none_match, &self.etag) {
            return http::build_304_response(&self.etag);
        }

        http::build_html_response(self.body.clone(), &self.etag, server_name, is_head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shape() {
        assert!(DOWNLOADS_PAGE.starts_with("<html>"));
        assert!(DOWNLOADS_PAGE.ends_with("</html>\n"));
        assert!(DOWNLOADS_PAGE.contains("linux amd64"));
    }

    #[test]
    fn test_single_download_row() {
        // Header row plus exactly one data row
        assert_eq!(DOWNLOADS_PAGE.matches("<tr>").count(), 2);
        assert_eq!(
            DOWNLOADS_PAGE
                .matches("href='https://go-lanscan.appspot.com/go-lanscan'")
                .count(),
            1
        );
    }

    #[test]
    fn test_single_source_link() {
        assert_eq!(
            DOWNLOADS_PAGE
                .matches("href='https://bitbucket.org/johnpfeiffer/go-lanscan'")
                .count(),
            1
        );
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let a = DownloadsPage::prepare();
        let b = DownloadsPage::prepare();
        assert_eq!(a.etag, b.etag);
        assert_eq!(a.body.len(), DOWNLOADS_PAGE.len());
    }

    #[test]
    fn test_respond_full() {
        let page = DownloadsPage::prepare();
        let resp = page.respond(None, false, "downloads-server");
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["Content-Length"],
            DOWNLOADS_PAGE.len().to_string().as_str()
        );
        assert_eq!(resp.headers()["ETag"], page.etag.as_str());
    }

    #[test]
    fn test_respond_not_modified() {
        let page = DownloadsPage::prepare();
        let resp = page.respond(Some(&page.etag), false, "downloads-server");
        assert_eq!(resp.status(), 304);
        // A stale validator still gets the full document
        let resp = page.respond(Some("\"stale\""), false, "downloads-server");
        assert_eq!(resp.status(), 200);
    }

    #[test]
    fn test_respond_head() {
        let page = DownloadsPage::prepare();
        let resp = page.respond(None, true, "downloads-server");
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["Content-Length"],
            DOWNLOADS_PAGE.len().to_string().as_str()
        );
    }
}
