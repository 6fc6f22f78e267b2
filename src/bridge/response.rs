use serde::{Deserialize, Serialize};

use crate::BridgeResult;

/// Ответ вызывающей стороне: флаг успеха, сообщение об ошибке и данные.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Данные успешной публикации.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishData {
    pub received: u64,
}

/// Данные успешного старта подписки.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeData {
    pub event_name: String,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            msg: String::new(),
            data: Some(data),
        }
    }

    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            msg: msg.into(),
            data: None,
        }
    }

    pub fn from_result(res: BridgeResult<T>) -> Self {
        match res {
            Ok(data) => Self::ok(data),
            Err(err) => Self::fail(err.client_message()),
        }
    }
}

impl Response<()> {
    /// Успех без данных.
    pub fn done() -> Self {
        Self {
            success: true,
            msg: String::new(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::BridgeError;

    #[test]
    fn test_success_shape() {
        let resp = Response::ok(PublishData { received: 0 });
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"success": true, "data": {"received": 0}})
        );
    }

    #[test]
    fn test_subscribe_data_is_camel_case() {
        let resp = Response::ok(SubscribeData {
            event_name: "sub:local:1:0".into(),
        });
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"success": true, "data": {"eventName": "sub:local:1:0"}})
        );
    }

    #[test]
    fn test_failure_carries_message() {
        let resp: Response<PublishData> =
            Response::from_result(Err(BridgeError::profile_not_found("prod")));
        assert!(!resp.success);
        assert_eq!(resp.msg, "no connection profile named: prod");
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"success": false, "msg": "no connection profile named: prod"})
        );
    }

    #[test]
    fn test_done_has_no_data() {
        assert_eq!(
            serde_json::to_value(Response::done()).unwrap(),
            json!({"success": true})
        );
    }
}
