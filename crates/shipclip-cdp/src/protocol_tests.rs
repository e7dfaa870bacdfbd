use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 7,
        method: "DOM.getDocument".to_string(),
        params: Some(serde_json::json!({"depth": 0})),
        session_id: Some("sess-1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("DOM.getDocument"));
    assert!(json.contains("\"sessionId\":\"sess-1\""));
}

#[test]
fn test_cdp_request_skips_absent_fields() {
    let req = CdpRequest {
        id: 1,
        method: "Page.enable".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("params"));
    assert!(!json.contains("sessionId"));
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"nodeId": 42}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
    assert!(resp.error.is_none());
}

#[test]
fn test_cdp_error_response_deserialize() {
    let json = r#"{"id": 3, "error": {"code": -32000, "message": "No node with given id"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    let err = resp.error.unwrap();
    assert_eq!(err.code, -32000);
    assert!(err.message.contains("No node"));
}

#[test]
fn test_cdp_event_deserialize() {
    let json = r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.0}, "sessionId": "s"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, None);
    assert_eq!(resp.method.as_deref(), Some("Page.loadEventFired"));
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "Order #29703 details",
        "url": "https://shop.example/wp-admin/post.php?post=29703&action=edit",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert_eq!(info.page_type, "page");
    assert!(info.url.contains("wp-admin"));
}

#[test]
fn test_browser_version_deserialize() {
    let json = r#"{
        "Browser": "Chrome/131.0.0.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/xyz"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.protocol_version, "1.3");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}

#[test]
fn test_remote_object_deserialize() {
    let json = r#"{"type": "object", "subtype": "node", "objectId": "obj-9"}"#;
    let obj: RemoteObject = serde_json::from_str(json).unwrap();
    assert_eq!(obj.object_id.as_deref(), Some("obj-9"));
    assert!(obj.value.is_none());
}
