use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};

/// Category of a flash message, used as a CSS class by the templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

/// One-shot message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }
}

// flash cookies only need to survive one redirect
const FLASH_MAX_AGE_SECS: i64 = 60;

pub fn encode(messages: &[FlashMessage]) -> String {
    let json = serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string());
    urlencoding::encode(&json).into_owned()
}

/// Decode a cookie value; anything unreadable yields no messages
pub fn decode(raw: &str) -> Vec<FlashMessage> {
    urlencoding::decode(raw)
        .ok()
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

/// Messages left for this request by the previous response
pub fn read(req: &HttpRequest, cookie_name: &str) -> Vec<FlashMessage> {
    req.cookie(cookie_name)
        .map(|c| decode(c.value()))
        .unwrap_or_default()
}

pub fn cookie(cookie_name: &str, messages: &[FlashMessage]) -> Cookie<'static> {
    Cookie::build(cookie_name.to_string(), encode(messages))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(FLASH_MAX_AGE_SECS))
        .finish()
}

pub fn removal(cookie_name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build(cookie_name.to_string(), "").path("/").finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_encode_decode() {
        let messages = vec![
            FlashMessage::success("Vehicle added successfully with ID: 12"),
            FlashMessage::error("Failed; try again & check \"VIN\""),
        ];
        assert_eq!(decode(&encode(&messages)), messages);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode("not-json").is_empty());
        assert!(decode("").is_empty());
    }

    #[test]
    fn test_read_from_request() {
        let messages = vec![FlashMessage::info("hello")];
        let req = TestRequest::default()
            .cookie(cookie("flash", &messages))
            .to_http_request();
        assert_eq!(read(&req, "flash"), messages);
        assert!(read(&req, "other").is_empty());
    }

    #[test]
    fn test_cookie_attributes() {
        let c = cookie("flash", &[FlashMessage::info("x")]);
        assert_eq!(c.path(), Some("/"));
        assert_eq!(c.http_only(), Some(true));

        let r = removal("flash");
        assert_eq!(r.value(), "");
        assert_eq!(r.max_age(), Some(CookieDuration::ZERO));
    }
}
