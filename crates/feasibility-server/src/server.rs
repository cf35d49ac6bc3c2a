use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use feasibility_engine::{
    AssessmentRecord, BatchRow, CoreError, EngineError, FeasibilityEngine, IdeaContext,
    IdeaRequest, RankedIdea, SignalBundle,
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR, SERVER_ERROR,
};

const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
const DEFAULT_RECOMMEND_COUNT: usize = 5;
const MAX_RECOMMEND_COUNT: usize = 20;

pub struct FeasibilityServer {
    engine: Arc<FeasibilityEngine>,
    runtime: Runtime,
    metrics: Arc<Mutex<MetricsRegistry>>,
    started: Instant,
}

#[derive(Debug, Default, Clone)]
struct ToolMetric {
    ok: u64,
    err: u64,
    total_latency_ms: f64,
    max_latency_ms: f64,
}

#[derive(Debug, Default)]
struct MetricsRegistry {
    tool: HashMap<String, ToolMetric>,
    rows_scored: u64,
    rows_failed: u64,
}

impl FeasibilityServer {
    pub fn new(config: &ServerConfig) -> Result<Self, String> {
        let engine = config.build_engine().map_err(|e| e.to_string())?;
        Self::with_engine(engine)
    }

    pub fn with_engine(engine: FeasibilityEngine) -> Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("failed to start async runtime: {e}"))?;
        Ok(Self {
            engine: Arc::new(engine),
            runtime,
            metrics: Arc::new(Mutex::new(MetricsRegistry::default())),
            started: Instant::now(),
        })
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "invalid jsonrpc version",
            ));
        }

        // Notifications never get a response.
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification ignored");
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_PROTOCOL_VERSION);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {
                            "name": "feasibility-server",
                            "version": env!("CARGO_PKG_VERSION")
                        },
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            }
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list_result()),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found"),
        };

        Some(response)
    }

    fn record_tool_metrics(&self, tool: &str, latency_ms: f64, is_error: bool) {
        let mut locked = self.metrics.lock();
        let metric = locked.tool.entry(tool.to_string()).or_default();
        if is_error {
            metric.err = metric.err.saturating_add(1);
        } else {
            metric.ok = metric.ok.saturating_add(1);
        }
        metric.total_latency_ms += latency_ms;
        metric.max_latency_ms = metric.max_latency_ms.max(latency_ms);
    }

    fn record_rows(&self, rows: &[RankedIdea]) {
        let failed = rows.iter().filter(|r| r.error().is_some()).count() as u64;
        let scored = rows.len() as u64 - failed;
        let mut locked = self.metrics.lock();
        locked.rows_scored = locked.rows_scored.saturating_add(scored);
        locked.rows_failed = locked.rows_failed.saturating_add(failed);
    }

    fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolsCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {err}"));
            }
        };

        let start = Instant::now();
        let tool = parsed.name.clone();
        let response = match parsed.name.as_str() {
            "idea_assess" => self.exec_idea_assess(id, parsed.arguments),
            "idea_rank" => self.exec_idea_rank(id, parsed.arguments),
            "idea_batch" => self.exec_idea_batch(id, parsed.arguments),
            "idea_recommend" => self.exec_idea_recommend(id, parsed.arguments),
            "engine_stats" => self.exec_engine_stats(id),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "unknown tool"),
        };
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(tool = %tool, latency_ms, error = response.error.is_some(), "tool call");
        self.record_tool_metrics(&tool, latency_ms, response.error.is_some());
        response
    }

    fn exec_idea_assess(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: IdeaAssessInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        let signals = args.signals.unwrap_or_default();
        let request = match args.idea.into_request() {
            Ok(v) => v,
            Err(err) => return engine_error_response(id, &err.into()),
        };

        match self
            .runtime
            .block_on(self.engine.assess(&request, signals))
        {
            Ok(assessment) => {
                let record = assessment.record(request.idea_text.clone());
                JsonRpcResponse::success(
                    id,
                    json!({
                        "structuredContent": {
                            "assessment": assessment,
                            "record": record
                        },
                        "content": [{
                            "type": "text",
                            "text": format!(
                                "score={:.3} risk={} outlook={} sentiment={}",
                                assessment.composite_score,
                                assessment.risk_level.as_str(),
                                assessment.market_outlook.as_str(),
                                assessment.sentiment_label.as_str()
                            )
                        }]
                    }),
                )
            }
            Err(err) => engine_error_response(id, &err),
        }
    }

    fn exec_idea_rank(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: IdeaRankInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        let context = match args.context.into_context() {
            Ok(v) => v,
            Err(msg) => return JsonRpcResponse::error(id, INVALID_PARAMS, msg),
        };
        let ranked = self.runtime.block_on(self.engine.rank(
            &args.ideas,
            &context,
            args.signals.unwrap_or_default(),
        ));
        self.record_rows(&ranked);
        JsonRpcResponse::success(id, ranked_result(&ranked))
    }

    fn exec_idea_batch(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: IdeaBatchInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        let rows: Vec<BatchRow> = args.requests.into_iter().map(batch_row).collect();
        let ranked = self
            .runtime
            .block_on(self.engine.assess_rows(rows, args.signals.unwrap_or_default()));
        self.record_rows(&ranked);
        JsonRpcResponse::success(id, ranked_result(&ranked))
    }

    fn exec_idea_recommend(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: IdeaRecommendInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        let count = args
            .count
            .unwrap_or(DEFAULT_RECOMMEND_COUNT)
            .clamp(1, MAX_RECOMMEND_COUNT);
        let context = match args.context.into_context() {
            Ok(v) => v,
            Err(msg) => return JsonRpcResponse::error(id, INVALID_PARAMS, msg),
        };

        match self.runtime.block_on(self.engine.recommend(
            &context,
            count,
            args.signals.unwrap_or_default(),
        )) {
            Ok(rec) => {
                self.record_rows(&rec.ranked);
                let records: Vec<AssessmentRecord> =
                    rec.ranked.iter().map(RankedIdea::record).collect();
                JsonRpcResponse::success(
                    id,
                    json!({
                        "structuredContent": {
                            "source": rec.source,
                            "generated": rec.generated,
                            "ranked": rec.ranked,
                            "records": records
                        },
                        "content": [{
                            "type": "text",
                            "text": format!("{} ideas from {}", records.len(), rec.source)
                        }]
                    }),
                )
            }
            Err(err) => engine_error_response(id, &err),
        }
    }

    fn exec_engine_stats(&self, id: Value) -> JsonRpcResponse {
        let locked = self.metrics.lock();
        let mut tools: Vec<(&String, &ToolMetric)> = locked.tool.iter().collect();
        tools.sort_by(|a, b| a.0.cmp(b.0));
        let tool_stats: Vec<Value> = tools
            .into_iter()
            .map(|(name, m)| {
                let calls = m.ok + m.err;
                let avg = if calls == 0 {
                    0.0
                } else {
                    m.total_latency_ms / calls as f64
                };
                json!({
                    "tool": name,
                    "ok": m.ok,
                    "err": m.err,
                    "avg_latency_ms": avg,
                    "max_latency_ms": m.max_latency_ms
                })
            })
            .collect();

        JsonRpcResponse::success(
            id,
            json!({
                "structuredContent": {
                    "engine": self.engine.info(),
                    "uptime_ms": u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "rows_scored": locked.rows_scored,
                    "rows_failed": locked.rows_failed,
                    "tools": tool_stats
                },
                "content": [{
                    "type": "text",
                    "text": format!(
                        "rows scored={}, failed={}",
                        locked.rows_scored, locked.rows_failed
                    )
                }]
            }),
        )
    }

    /// Newline-delimited JSON-RPC over any reader/writer pair. Returns when
    /// the reader reaches end of input.
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> io::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(v) => v,
                Err(err) => {
                    let response =
                        JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {err}"));
                    write_response(&mut writer, &response)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_response(&mut writer, &response)?;
            }
        }
        Ok(())
    }

    pub fn serve_stdio(&self) -> io::Result<()> {
        info!(engine = ?self.engine.info(), "serving JSON-RPC on stdio");
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }
}

fn write_response<W: Write>(writer: &mut W, response: &JsonRpcResponse) -> io::Result<()> {
    let serialized = serde_json::to_string(response)?;
    writeln!(writer, "{serialized}")?;
    writer.flush()
}

fn with_id(mut response: JsonRpcResponse, id: Value) -> JsonRpcResponse {
    response.id = id;
    response
}

fn engine_error_response(id: Value, err: &EngineError) -> JsonRpcResponse {
    let kind = err.kind();
    if kind == "configuration_invariant" {
        error!(error = %err, "configuration invariant violated");
    }
    let code = if kind == "input_validation" {
        INVALID_PARAMS
    } else {
        SERVER_ERROR
    };
    let missing = match err {
        EngineError::Core(feasibility_engine::CoreError::InsufficientSignal { missing }) => {
            Some(missing.clone())
        }
        _ => None,
    };
    JsonRpcResponse::error_with_data(
        id,
        code,
        err.to_string(),
        Some(json!({ "kind": kind, "missing_signals": missing })),
    )
}

fn ranked_result(ranked: &[RankedIdea]) -> Value {
    let records: Vec<AssessmentRecord> = ranked.iter().map(RankedIdea::record).collect();
    let failed = records.iter().filter(|r| r.error.is_some()).count();
    json!({
        "structuredContent": {
            "ranked": ranked,
            "records": records
        },
        "content": [{
            "type": "text",
            "text": format!("{} rows ranked, {} failed", ranked.len(), failed)
        }]
    })
}

fn tools_list_result() -> Value {
    let idea_props = json!({
        "idea_text": {"type": "string"},
        "industry": {"type": "string"},
        "target_market": {"type": "string"},
        "initial_investment": {"type": "number", "minimum": 0},
        "target_roi": {"type": "number", "description": "Fraction, 0.3 = 30%"},
        "target_roi_percent": {"type": "number", "description": "Percent, 30 = 30%"}
    });
    let signals = json!({
        "type": "object",
        "properties": {
            "sentiment": {"type": "array", "items": {"type": "object", "properties": {"text": {"type": "string"}, "timestamp_ms": {"type": "integer"}}}},
            "market": {"type": "array", "items": {"type": "object", "properties": {"timestamp_ms": {"type": "integer"}, "price": {"type": "number"}}}}
        }
    });
    let context_props = json!({
        "industry": {"type": "string"},
        "target_market": {"type": "string"},
        "initial_investment": {"type": "number", "minimum": 0},
        "target_roi": {"type": "number"},
        "target_roi_percent": {"type": "number"},
        "signals": signals
    });

    let mut assess_props = idea_props.clone();
    if let Some(map) = assess_props.as_object_mut() {
        map.insert("signals".to_string(), signals.clone());
    }
    let mut rank_props = context_props.clone();
    if let Some(map) = rank_props.as_object_mut() {
        map.insert(
            "ideas".to_string(),
            json!({"type": "array", "items": {"type": "string"}}),
        );
    }
    let mut recommend_props = context_props;
    if let Some(map) = recommend_props.as_object_mut() {
        map.insert(
            "count".to_string(),
            json!({"type": "integer", "minimum": 1, "maximum": MAX_RECOMMEND_COUNT}),
        );
    }

    json!({
        "tools": [
            {
                "name": "idea_assess",
                "description": "Score one business idea: composite feasibility, risk level, market outlook, sentiment and per-signal explanation.",
                "inputSchema": {
                    "type": "object",
                    "required": ["idea_text"],
                    "properties": assess_props
                }
            },
            {
                "name": "idea_rank",
                "description": "Score ideas that share an industry and financial context and return them ranked by composite score.",
                "inputSchema": {
                    "type": "object",
                    "required": ["ideas"],
                    "properties": rank_props
                }
            },
            {
                "name": "idea_batch",
                "description": "Score independent idea requests; invalid rows are reported per row without aborting the batch.",
                "inputSchema": {
                    "type": "object",
                    "required": ["requests"],
                    "properties": {
                        "requests": {"type": "array", "items": {"type": "object", "properties": idea_props}},
                        "signals": signals
                    }
                }
            },
            {
                "name": "idea_recommend",
                "description": "Generate candidate ideas for an industry and target market, then rank them.",
                "inputSchema": {
                    "type": "object",
                    "required": ["industry"],
                    "properties": recommend_props
                }
            },
            {
                "name": "engine_stats",
                "description": "Engine collaborators, row counters and per-tool latency.",
                "inputSchema": {"type": "object", "properties": {}}
            }
        ]
    })
}

fn parse_args<T: for<'de> Deserialize<'de>>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    let Some(args) = arguments else {
        return Err(JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            "missing tool arguments",
        ));
    };
    serde_json::from_value(args).map_err(|err| {
        JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            format!("invalid tool arguments: {err}"),
        )
    })
}

/// Decodes one batch row. A row that cannot become a request is kept as a
/// rejected row so the rest of the batch still scores.
fn batch_row(raw: Value) -> BatchRow {
    let idea_text = raw
        .get("idea_text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let decoded = serde_json::from_value::<IdeaInput>(raw)
        .map_err(|err| CoreError::InvalidInput {
            field: "request",
            reason: err.to_string(),
        })
        .and_then(IdeaInput::into_request);
    match decoded {
        Ok(request) => BatchRow::Request(request),
        Err(error) => {
            debug!(idea = %idea_text, error = %error, "batch row rejected");
            BatchRow::Rejected { idea_text, error }
        }
    }
}

/// `target_roi` is a fraction; `target_roi_percent` is the same value in
/// percent. Supplying both is ambiguous.
fn resolve_roi(fraction: Option<f64>, percent: Option<f64>) -> Result<Option<f64>, String> {
    match (fraction, percent) {
        (Some(_), Some(_)) => {
            Err("supply either target_roi or target_roi_percent, not both".to_string())
        }
        (Some(f), None) => Ok(Some(f)),
        (None, Some(p)) => Ok(Some(p / 100.0)),
        (None, None) => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct IdeaInput {
    #[serde(default)]
    idea_text: String,
    #[serde(default)]
    industry: String,
    #[serde(default)]
    target_market: String,
    initial_investment: Option<f64>,
    target_roi: Option<f64>,
    target_roi_percent: Option<f64>,
}

impl IdeaInput {
    fn into_request(self) -> Result<IdeaRequest, CoreError> {
        let target_roi = resolve_roi(self.target_roi, self.target_roi_percent).map_err(|reason| {
            CoreError::InvalidInput {
                field: "target_roi",
                reason,
            }
        })?;
        Ok(IdeaRequest {
            idea_text: self.idea_text,
            industry: self.industry,
            target_market: self.target_market,
            initial_investment: self.initial_investment,
            target_roi,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ContextInput {
    #[serde(default)]
    industry: String,
    #[serde(default)]
    target_market: String,
    initial_investment: Option<f64>,
    target_roi: Option<f64>,
    target_roi_percent: Option<f64>,
}

impl ContextInput {
    fn into_context(self) -> Result<IdeaContext, String> {
        Ok(IdeaContext {
            industry: self.industry,
            target_market: self.target_market,
            initial_investment: self.initial_investment,
            target_roi: resolve_roi(self.target_roi, self.target_roi_percent)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct IdeaAssessInput {
    #[serde(flatten)]
    idea: IdeaInput,
    signals: Option<SignalBundle>,
}

#[derive(Debug, Deserialize)]
struct IdeaRankInput {
    ideas: Vec<String>,
    #[serde(flatten)]
    context: ContextInput,
    signals: Option<SignalBundle>,
}

#[derive(Debug, Deserialize)]
struct IdeaBatchInput {
    requests: Vec<Value>,
    signals: Option<SignalBundle>,
}

#[derive(Debug, Deserialize)]
struct IdeaRecommendInput {
    #[serde(flatten)]
    context: ContextInput,
    count: Option<usize>,
    signals: Option<SignalBundle>,
}
