//! 性能基准测试模块
//!
//! 编解码与格式化都是O(文档大小)的单遍操作，这里做量级上的健全性测量，
//! 供回归时对比

use std::time::Instant;

use serde_json::{json, Value};

use crate::model::transcode;

/// 单项测量结果
#[derive(Debug)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    fn record(operation: &str, started: Instant, success: bool, details: String) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms: started.elapsed().as_millis(),
            success,
            details,
        }
    }
}

/// 生成指定深度/宽度的嵌套测试文档
pub fn generate_document(depth: usize, width: usize) -> Value {
    fn nested(current: usize, max: usize, width: usize) -> Value {
        if current >= max {
            return json!("叶子节点值");
        }
        let mut obj = serde_json::Map::new();
        for i in 0..width {
            let value = match i % 5 {
                0 => json!(format!("字符串值_{}", i)),
                1 => json!(i as i64),
                2 => json!(i % 2 == 0),
                3 => json!(["换行\n", "制表\t", "引号\""]),
                4 => nested(current + 1, max, width / 2),
                _ => json!(null),
            };
            obj.insert(format!("field_{}", i), value);
        }
        Value::Object(obj)
    }

    json!({
        "metadata": {"depth": depth, "width": width},
        "data": nested(0, depth, width),
    })
}

/// 测量编码（紧凑序列化 + 转义 + 包裹）
pub fn benchmark_encode(value: &Value) -> PerformanceResult {
    let started = Instant::now();
    match transcode::encode(value) {
        Ok(wire) => PerformanceResult::record(
            "编码",
            started,
            true,
            format!("产出 {} 字符的转义串", wire.len()),
        ),
        Err(e) => PerformanceResult::record("编码", started, false, format!("编码失败: {}", e)),
    }
}

/// 测量解码（解包 + 还原转义 + 解析）
pub fn benchmark_decode(wire: &str) -> PerformanceResult {
    let started = Instant::now();
    match transcode::decode(wire) {
        Ok(_) => PerformanceResult::record(
            "解码",
            started,
            true,
            format!("解码了 {} 字符的输入", wire.len()),
        ),
        Err(e) => PerformanceResult::record("解码", started, false, format!("解码失败: {}", e)),
    }
}

/// 测量格式化输出
pub fn benchmark_pretty_print(value: &Value) -> PerformanceResult {
    let started = Instant::now();
    match transcode::pretty_print(value, 2) {
        Ok(text) => PerformanceResult::record(
            "格式化",
            started,
            true,
            format!("产出 {} 字符", text.len()),
        ),
        Err(e) => PerformanceResult::record("格式化", started, false, format!("格式化失败: {}", e)),
    }
}

/// 运行综合性能测试
pub fn run_performance_suite() -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    // 小型 / 中型 / 大型三档
    for (depth, width) in [(3, 10), (4, 20), (5, 30)] {
        let value = generate_document(depth, width);

        results.push(benchmark_pretty_print(&value));
        let encode_result = benchmark_encode(&value);
        let wire = transcode::encode(&value).unwrap_or_default();
        results.push(encode_result);
        results.push(benchmark_decode(&wire));
    }

    results
}
