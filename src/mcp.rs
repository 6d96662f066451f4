//! MCP (Model Context Protocol) server implementation.
//!
//! Implements the JSON-RPC 2.0 protocol over stdio, exposing the Narou
//! tools for AI agent integration.

use crate::catalog::{self, LabelMap, Notation};
use crate::client::{Fetcher, NarouClient};
use crate::error::{NarouError, Result};
use crate::schema::{
    NCODE_PATTERN, RANKING_LIMIT_MAX, RANKING_OFFSET_MAX, SEARCH_LIMIT_MAX, SEARCH_START_MAX,
};
use crate::tools::{self, Content};
use serde_json::{json, Map, Value};
use std::io::{self, BufRead, Write};

/// Run the MCP server over stdin/stdout.
pub async fn run_server<F: Fetcher>(client: NarouClient<F>) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "narou MCP server listening on stdio");

    for line in stdin.lock().lines() {
        let line = line.map_err(|e| NarouError::Config(format!("stdin error: {}", e)))?;
        let Some(response) = handle_line(&client, &line).await else {
            continue;
        };

        let mut out = stdout.lock();
        writeln!(out, "{}", response)
            .map_err(|e| NarouError::Config(format!("stdout error: {}", e)))?;
        out.flush()
            .map_err(|e| NarouError::Config(format!("stdout flush error: {}", e)))?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Handle one JSON-RPC frame. `None` for notifications and blank lines.
pub async fn handle_line<F: Fetcher>(client: &NarouClient<F>, line: &str) -> Option<Value> {
    if line.trim().is_empty() {
        return None;
    }

    let request: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable JSON-RPC frame");
            return Some(json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32700, "message": format!("Parse error: {}", e) }
            }));
        }
    };

    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or("");
    tracing::debug!(method, "JSON-RPC request");

    let response = match method {
        "initialize" => handle_initialize(&id),
        "ping" => json!({ "jsonrpc": "2.0", "id": id, "result": {} }),
        "tools/list" => handle_tools_list(&id),
        "tools/call" => handle_tool_call(client, &id, &request["params"]).await,
        "resources/list" => handle_resources_list(&id),
        "resources/read" => handle_resource_read(&id, &request["params"]),
        m if m.starts_with("notifications/") => return None,
        _ => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": format!("Method not found: {}", method) }
        }),
    };
    Some(response)
}

fn handle_initialize(id: &Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": "narou-mcp",
                "version": env!("CARGO_PKG_VERSION")
            }
        }
    })
}

fn handle_tools_list(id: &Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "tools": tool_definitions()
        }
    })
}

const VOCABULARY_URI: &str = "narou://vocabulary";

fn handle_resources_list(id: &Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "resources": [
                {
                    "uri": VOCABULARY_URI,
                    "name": "Narou label vocabulary",
                    "description": "Every accepted label for genre, order, field and other enumerated inputs, with its API code",
                    "mimeType": "application/json"
                }
            ]
        }
    })
}

fn handle_resource_read(id: &Value, params: &Value) -> Value {
    let uri = params["uri"].as_str().unwrap_or("");
    if uri != VOCABULARY_URI {
        return json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32602, "message": format!("Unknown resource: {}", uri) }
        });
    }

    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "contents": [{
                "uri": uri,
                "mimeType": "application/json",
                "text": format!("{:#}", vocabulary())
            }]
        }
    })
}

async fn handle_tool_call<F: Fetcher>(
    client: &NarouClient<F>,
    id: &Value,
    params: &Value,
) -> Value {
    let tool_name = params["name"].as_str().unwrap_or("");
    let args = &params["arguments"];

    match tools::call_tool(client, tool_name, args).await {
        Ok(content) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {
                "content": content.iter().map(Content::to_mcp).collect::<Vec<_>>()
            }
        }),
        Err(e) => {
            tracing::warn!(tool = tool_name, error = %e, "tool call failed");
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "content": [{ "type": "text", "text": error_text(&e) }],
                    "isError": true
                }
            })
        }
    }
}

/// Tell "fix your input" apart from "try again later".
fn error_text(e: &NarouError) -> String {
    if e.is_remote() {
        format!("Error: remote Narou API failure, try again later. {}", e)
    } else {
        format!("Error: {}", e)
    }
}

/// Every label table as `{domain: {label: code}}`.
fn vocabulary() -> Value {
    fn section<C: Notation>(out: &mut Map<String, Value>, map: &LabelMap<C>)
    where
        Value: From<C::Code>,
    {
        let entries: Map<String, Value> = map
            .labels()
            .filter_map(|label| {
                let value = map.to_code(label).ok()?;
                Some((label.to_string(), Value::from(value.code())))
            })
            .collect();
        out.insert(map.domain().to_string(), Value::Object(entries));
    }

    let mut out = Map::new();
    section(&mut out, catalog::genres());
    section(&mut out, catalog::big_genres());
    section(&mut out, catalog::orders());
    section(&mut out, catalog::novel_types());
    section(&mut out, catalog::ranking_types());
    section(&mut out, catalog::r18_sites());
    section(&mut out, catalog::user_orders());
    section(&mut out, catalog::buntai());
    section(&mut out, catalog::fields());
    section(&mut out, catalog::r18_fields());
    section(&mut out, catalog::user_fields());
    Value::Object(out)
}

// --- Tool declarations ---

fn labels<C: Notation>(map: &LabelMap<C>, description: &str) -> Value {
    json!({
        "type": "string",
        "enum": map.labels().collect::<Vec<_>>(),
        "description": description
    })
}

fn label_list<C: Notation>(map: &LabelMap<C>, description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string", "enum": map.labels().collect::<Vec<_>>() },
        "description": description
    })
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn boolean(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

fn count(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 0, "description": description })
}

fn bounded(description: &str, min: u64, max: Option<u64>, default: Option<u64>) -> Value {
    let mut prop = json!({ "type": "integer", "minimum": min, "description": description });
    if let Some(max) = max {
        prop["maximum"] = json!(max);
    }
    if let Some(default) = default {
        prop["default"] = json!(default);
    }
    prop
}

fn ncode() -> Value {
    json!({ "type": "string", "pattern": NCODE_PATTERN, "description": "小説のNコード" })
}

fn one_or_many(item_type: &str, description: &str) -> Value {
    json!({
        "anyOf": [
            { "type": item_type },
            { "type": "array", "items": { "type": item_type } }
        ],
        "description": description
    })
}

fn tool(
    name: &str,
    title: &str,
    description: &str,
    properties: Map<String, Value>,
    required: &[&str],
) -> Value {
    json!({
        "name": name,
        "title": title,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": required
        },
        "annotations": {
            "title": title,
            "readOnlyHint": true,
            "destructiveHint": false,
            "idempotentHint": true,
            "openWorldHint": true
        }
    })
}

fn props(entries: Vec<(&str, Value)>) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Declarations of every tool, built from the label tables.
pub fn tool_definitions() -> Value {
    let genre = catalog::genres();
    let big_genre = catalog::big_genres();
    let search_limit = || bounded("取得件数（1-500）", 1, Some(SEARCH_LIMIT_MAX), Some(20));
    let search_start = || bounded("取得開始位置（1ベース）", 1, Some(SEARCH_START_MAX), None);

    let get_novel = tool(
        "get_novel",
        "小説取得",
        "小説家になろうの小説を取得します。",
        props(vec![
            ("ncode", ncode()),
            ("fields", label_list(catalog::fields(), "取得するフィールド")),
        ]),
        &["ncode"],
    );

    let search_novels = tool(
        "search_novels",
        "小説検索",
        "小説家になろうから小説を検索します。",
        props(vec![
            ("word", string("検索キーワード")),
            ("notword", string("除外キーワード")),
            ("ncode", one_or_many("string", "Nコード（単一または配列）")),
            ("userId", one_or_many("integer", "ユーザーID（単一または配列）")),
            ("genre", labels(genre, "ジャンル")),
            ("notGenre", labels(genre, "除外ジャンル")),
            ("bigGenre", labels(big_genre, "大ジャンル")),
            ("notBigGenre", labels(big_genre, "除外大ジャンル")),
            ("novelType", labels(catalog::novel_types(), "小説タイプ")),
            ("buntai", labels(catalog::buntai(), "文体")),
            ("minLength", count("最小文字数")),
            ("maxLength", count("最大文字数")),
            ("minTime", count("最小読了時間（分）")),
            ("maxTime", count("最大読了時間（分）")),
            ("minKaiwaritu", count("最小会話率（%）")),
            ("maxKaiwaritu", count("最大会話率（%）")),
            ("minSasie", count("最小挿絵数")),
            ("maxSasie", count("最大挿絵数")),
            ("lastUpdateFrom", string("最終更新日時開始（YYYY-MM-DD HH:MM:SS）。単独指定時は thisweek などの期間指定も可")),
            ("lastUpdateTo", string("最終更新日時終了（YYYY-MM-DD HH:MM:SS）")),
            ("lastNovelUpdateFrom", string("小説更新日時開始（YYYY-MM-DD HH:MM:SS）。単独指定時は thisweek などの期間指定も可")),
            ("lastNovelUpdateTo", string("小説更新日時終了（YYYY-MM-DD HH:MM:SS）")),
            ("isR15", boolean("true: R15作品のみ / false: R15作品を除外")),
            ("isBL", boolean("true: BL作品のみ / false: BL作品を除外")),
            ("isGL", boolean("true: GL作品のみ / false: GL作品を除外")),
            ("isZankoku", boolean("true: 残酷な描写ありのみ / false: 除外")),
            ("isTensei", boolean("true: 異世界転生のみ / false: 除外")),
            ("isTenni", boolean("true: 異世界転移のみ / false: 除外")),
            ("isStop", boolean("true: 長期連載停止中のみ / false: 除外")),
            ("isPickup", boolean("ピックアップ作品のみ")),
            ("isTT", boolean("異世界転生・転移作品のみ")),
            ("byTitle", json!({ "type": "boolean", "default": true, "description": "作品名を検索対象とする" })),
            ("byOutline", json!({ "type": "boolean", "default": true, "description": "あらすじを検索対象とする" })),
            ("byKeyword", json!({ "type": "boolean", "default": true, "description": "キーワードを検索対象とする" })),
            ("byAuthor", json!({ "type": "boolean", "default": true, "description": "作者名を検索対象とする" })),
            ("fields", label_list(catalog::fields(), "取得するフィールド")),
            ("order", labels(catalog::orders(), "並び順（デフォルト：新着更新順）")),
            ("limit", search_limit()),
            ("start", search_start()),
        ]),
        &[],
    );

    let get_ranking = tool(
        "get_ranking",
        "ランキング取得",
        "小説家になろうのランキングを取得します。",
        props(vec![
            ("date", string("集計日（YYYY-MM-DD形式）。種別指定時は集計日に補正されます")),
            ("rankingType", labels(catalog::ranking_types(), "ランキング種別")),
            ("fields", label_list(catalog::fields(), "取得するフィールド")),
            ("genre", labels(genre, "ジャンルで絞り込み")),
            ("bigGenre", labels(big_genre, "大ジャンルで絞り込み")),
            ("limit", bounded("取得件数", 1, Some(RANKING_LIMIT_MAX), Some(10))),
            ("offset", bounded("取得開始位置（0ベース）", 0, Some(RANKING_OFFSET_MAX), Some(0))),
        ]),
        &[],
    );

    let search_r18 = tool(
        "search_r18_novels",
        "R18小説検索",
        "R18小説を検索します。",
        props(vec![
            ("word", string("検索キーワード")),
            ("fields", label_list(catalog::r18_fields(), "R18検索用の取得フィールド")),
            ("r18Site", labels(catalog::r18_sites(), "R18サイト")),
            ("order", labels(catalog::orders(), "並び順（デフォルト：新着更新順）")),
            ("novelType", labels(catalog::novel_types(), "小説タイプ")),
            ("limit", search_limit()),
            ("start", search_start()),
        ]),
        &[],
    );

    let search_users = tool(
        "search_users",
        "ユーザー検索",
        "小説家になろうのユーザーを検索します。",
        props(vec![
            ("word", string("検索キーワード")),
            ("notword", string("除外キーワード")),
            ("userId", count("ユーザーID")),
            ("name1st", string("ユーザー名フリガナの頭文字")),
            ("minNovel", count("最小小説投稿数")),
            ("maxNovel", count("最大小説投稿数")),
            ("minReview", count("最小レビュー投稿数")),
            ("maxReview", count("最大レビュー投稿数")),
            ("fields", label_list(catalog::user_fields(), "ユーザー検索用の取得フィールド")),
            ("order", labels(catalog::user_orders(), "ユーザー検索並び順（デフォルト：ユーザIDの新しい順）")),
            ("limit", search_limit()),
            ("start", search_start()),
        ]),
        &[],
    );

    let history = tool(
        "get_ranking_history",
        "ランキング履歴取得",
        "指定した小説のランキング履歴を取得します。",
        props(vec![
            ("ncode", ncode()),
            ("limit", bounded("取得件数制限（デフォルト：50件）", 1, None, Some(50))),
            ("offset", bounded("取得開始位置（デフォルト：0）", 0, None, Some(0))),
            ("rankingType", labels(catalog::ranking_types(), "特定のランキングタイプのみ取得")),
            ("dateFrom", string("集計日開始（YYYY-MM-DD形式）")),
            ("dateTo", string("集計日終了（YYYY-MM-DD形式）")),
        ]),
        &["ncode"],
    );

    json!([get_novel, search_novels, get_ranking, search_r18, search_users, history])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::StubFetcher;
    use crate::tools::TOOL_NAMES;

    #[test]
    fn test_tool_definitions_cover_every_tool() {
        let defs = tool_definitions();
        let names: Vec<_> = defs
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, TOOL_NAMES.to_vec());
        for def in defs.as_array().unwrap() {
            assert_eq!(def["inputSchema"]["type"], "object");
            assert_eq!(def["annotations"]["readOnlyHint"], true);
        }
    }

    #[test]
    fn test_declared_constraints() {
        let defs = tool_definitions();
        let search = &defs[1]["inputSchema"]["properties"];
        assert_eq!(search["limit"]["maximum"], 500);
        assert_eq!(search["limit"]["default"], 20);
        assert_eq!(search["start"]["minimum"], 1);
        assert_eq!(search["genre"]["enum"].as_array().unwrap().len(), catalog::genres().len());

        let ranking = &defs[2]["inputSchema"]["properties"];
        assert_eq!(ranking["limit"]["maximum"], 300);
        assert_eq!(ranking["offset"]["minimum"], 0);

        assert_eq!(defs[0]["inputSchema"]["properties"]["ncode"]["pattern"], NCODE_PATTERN);
        assert_eq!(defs[5]["inputSchema"]["required"], json!(["ncode"]));
        assert_eq!(defs[3]["title"], "R18小説検索");
    }

    #[tokio::test]
    async fn test_initialize_and_list() {
        let client = StubFetcher::new().client();
        let init = handle_line(&client, r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        assert_eq!(init["result"]["serverInfo"]["name"], "narou-mcp");

        let list = handle_line(&client, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(list["id"], 2);
        assert_eq!(list["result"]["tools"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_notifications_and_blank_lines_get_no_reply() {
        let client = StubFetcher::new().client();
        assert!(handle_line(&client, "   ").await.is_none());
        assert!(handle_line(&client, r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_parse_error_and_unknown_method() {
        let client = StubFetcher::new().client();
        let reply = handle_line(&client, "{not json").await.unwrap();
        assert_eq!(reply["error"]["code"], -32700);

        let reply = handle_line(&client, r#"{"jsonrpc":"2.0","id":3,"method":"sampling/create"}"#)
            .await
            .unwrap();
        assert_eq!(reply["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_tool_call_renders_content_blocks() {
        let client = StubFetcher::new()
            .route("/novelapi/", r#"[{"allcount":1},{"ncode":"N1111AA","genre":101}]"#)
            .client();
        let reply = handle_line(
            &client,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"search_novels","arguments":{"word":"恋"}}}"#,
        )
        .await
        .unwrap();
        let content = reply["result"]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "検索結果: 1件中 1〜1件目");
        assert!(content[1]["text"].as_str().unwrap().contains("異世界〔恋愛〕"));
        assert!(reply["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn test_validation_and_remote_errors_are_distinguishable() {
        let client = StubFetcher::new().fail("/novelapi/", 503).client();

        let invalid = handle_line(
            &client,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"search_novels","arguments":{"limit":0}}}"#,
        )
        .await
        .unwrap();
        assert_eq!(invalid["result"]["isError"], true);
        let text = invalid["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error: Invalid input: limit"), "{text}");

        let remote = handle_line(
            &client,
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"get_novel","arguments":{"ncode":"n1234ab"}}}"#,
        )
        .await
        .unwrap();
        assert_eq!(remote["result"]["isError"], true);
        let text = remote["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("remote Narou API failure"), "{text}");
    }

    #[tokio::test]
    async fn test_vocabulary_resource() {
        let client = StubFetcher::new().client();
        let reply = handle_line(
            &client,
            r#"{"jsonrpc":"2.0","id":7,"method":"resources/read","params":{"uri":"narou://vocabulary"}}"#,
        )
        .await
        .unwrap();
        let contents = &reply["result"]["contents"][0];
        assert_eq!(contents["mimeType"], "application/json");
        let vocabulary: Value = serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
        assert_eq!(vocabulary["genre"]["ハイファンタジー〔ファンタジー〕"], 201);
        assert_eq!(vocabulary["order"]["新着更新順"], "new");
        assert_eq!(
            vocabulary["r18Fields"].as_object().unwrap().len(),
            catalog::r18_fields().len()
        );
    }
}
