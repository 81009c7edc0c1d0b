//! 转义字符串编解码：被外层引号包裹的JSON文本与Value之间的纯转换

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use crate::model::session::AppError;

/// 解码外部文本为JSON值
///
/// 去掉首尾空白后，若文本被一对双引号包裹则视为转义字符串：
/// 剥掉外层引号并还原内部转义，再按标准JSON解析；未包裹则直接解析。
/// 解析失败时错误消息原样来自serde_json。
pub fn decode(input: &str) -> Result<Value, AppError> {
    let trimmed = input.trim();
    let inner = match unwrap_quoted(trimmed) {
        Some(interior) => unescape(interior),
        None => trimmed.to_string(),
    };
    Ok(serde_json::from_str(&inner)?)
}

/// 编码JSON值为转义字符串
///
/// 紧凑序列化（对象键按插入顺序），逐字符转义后包上一对双引号。
/// 对任意值满足 decode(encode(v)) == v
pub fn encode(value: &Value) -> Result<String, AppError> {
    let compact = serde_json::to_string(value)?;
    let mut out = String::with_capacity(compact.len() + 2);
    out.push('"');
    for c in compact.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    Ok(out)
}

/// 按指定缩进宽度格式化；宽度为0时输出紧凑形式
pub fn pretty_print(value: &Value, indent_width: usize) -> Result<String, AppError> {
    if indent_width == 0 {
        return Ok(serde_json::to_string(value)?);
    }
    let indent = vec![b' '; indent_width];
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| AppError::State(format!("序列化输出非UTF-8: {}", e)))
}

/// 纯语法校验：编辑器内容是未包裹的JSON文本，直接解析
pub fn validate(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}

/// 剥离成对的外层双引号；长度不足两个字符或未成对包裹时返回None
fn unwrap_quoted(text: &str) -> Option<&str> {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// 还原转义序列：单次从左到右扫描
///
/// 扫描保证每个反斜杠只参与一次匹配，`\\n` 还原为反斜杠加字母n
/// 而不是反斜杠加换行。转义集之外的序列（如 `\b`、`é`）
/// 原样保留，交给内层JSON解析处理。
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            // 末尾孤立的反斜杠原样保留
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_wrapped_string() {
        let value = decode(r#""{\"a\":1}""#).expect("解码转义字符串应该成功");
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_decode_bare_json() {
        let value = decode(r#"{"a": [1, 2, 3]}"#).expect("解码裸JSON应该成功");
        assert_eq!(value, json!({"a": [1, 2, 3]}));
    }

    #[test]
    fn test_decode_trims_whitespace() {
        let value = decode("  \n\t \"{\\\"k\\\":true}\"  \n").expect("首尾空白应该被忽略");
        assert_eq!(value, json!({"k": true}));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let result = decode("not json");
        assert!(result.is_err(), "非JSON文本应该返回解析错误");
        let msg = result.unwrap_err().to_string();
        assert!(!msg.is_empty(), "错误消息应该携带解析器原文");
    }

    #[test]
    fn test_decode_empty_wrapper_is_error() {
        // 两个引号剥掉外层后内部为空，空文本不是合法JSON
        assert!(decode(r#""""#).is_err(), "空包裹应该返回解析错误");
    }

    #[test]
    fn test_decode_lone_quote_is_error() {
        assert!(decode("\"").is_err(), "单个引号不构成包裹，也不是合法JSON");
    }

    #[test]
    fn test_decode_formatting_whitespace_escapes() {
        // 线格式里单层的 \n \t 还原成词法间的真实空白，合法
        let value = decode("\"{\\n\\t\\\"a\\\": 1\\n}\"").expect("解码应该成功");
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_decode_in_string_escapes_are_double_layered() {
        // 内嵌文档字符串值里的换行在线格式中是 \\n：
        // 外层还原掉一层反斜杠，内层JSON解析还原第二层
        let value = decode(r#""{\"text\":\"第一行\\n第二行\\t缩进\"}""#).expect("解码应该成功");
        assert_eq!(value, json!({"text": "第一行\n第二行\t缩进"}));
    }

    #[test]
    fn test_encode_compact_and_ordered() {
        let value = json!({"a": 1, "b": [true, null]});
        let wire = encode(&value).expect("编码应该成功");
        assert_eq!(wire, r#""{\"a\":1,\"b\":[true,null]}""#, "键序应保持插入顺序且无缩进");
    }

    #[test]
    fn test_round_trip_all_kinds() {
        let samples = vec![
            json!(null),
            json!(true),
            json!(-3.25),
            json!("纯字符串"),
            json!([]),
            json!({}),
            json!({"用户": {"名字": "张三", "标签": ["a", "b"]}, "count": 42}),
            json!({"text": "含\"引号\"与\\反斜杠\\"}),
            json!({"ws": "换行\n回车\r制表\t混合"}),
        ];
        for v in samples {
            let wire = encode(&v).expect("编码应该成功");
            let back = decode(&wire).expect("回解码应该成功");
            assert_eq!(back, v, "往返后应该深度相等: {}", v);
        }
    }

    #[test]
    fn test_round_trip_backslash_before_n() {
        // 逐项替换式还原会把编码产物中的 \\\\n 错还原成反斜杠加换行，
        // 单次扫描必须保住这一类值
        let v = json!({"s": "a\\nb", "t": "尾部反斜杠\\"});
        let wire = encode(&v).expect("编码应该成功");
        let back = decode(&wire).expect("回解码应该成功");
        assert_eq!(back, v);
    }

    #[test]
    fn test_round_trip_other_control_chars() {
        // 退格、换页不在转义集里，由内层serde_json转义承担
        let v = json!({"ctl": "a\u{8}b\u{c}c"});
        let wire = encode(&v).expect("编码应该成功");
        assert!(!wire.contains('\u{8}'), "控制符不应以原始字节出现在线格式中");
        let back = decode(&wire).expect("回解码应该成功");
        assert_eq!(back, v);
    }

    #[test]
    fn test_decode_unknown_escape_passes_through() {
        // \b 不在转义集中，原样透传后由内层解析还原为退格
        let value = decode(r#""{\"s\":\"x\bx\"}""#).expect("解码应该成功");
        assert_eq!(value, json!({"s": "x\u{8}x"}));
    }

    #[test]
    fn test_decode_raw_control_byte_fails() {
        // 线格式中出现原始控制字节时内层解析拒绝，这是已知且有意保留的缺口
        let wire = format!("\"{{\\\"s\\\":\\\"a{}b\\\"}}\"", '\u{8}');
        assert!(decode(&wire).is_err(), "原始控制字节应该导致解析错误");
    }

    #[test]
    fn test_pretty_print_zero_is_compact() {
        let v = json!({"a": [1, 2]});
        let text = pretty_print(&v, 0).expect("格式化应该成功");
        assert_eq!(text, r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_pretty_print_custom_width() {
        let v = json!({"a": 1});
        let two = pretty_print(&v, 2).expect("格式化应该成功");
        let four = pretty_print(&v, 4).expect("格式化应该成功");
        assert!(two.contains("\n  \"a\": 1"), "两空格缩进: {}", two);
        assert!(four.contains("\n    \"a\": 1"), "四空格缩进: {}", four);
    }

    #[test]
    fn test_pretty_print_idempotent() {
        let v = json!({"b": {"c": [1, 2, 3]}, "a": "文本"});
        let once = pretty_print(&v, 2).expect("格式化应该成功");
        let reparsed = validate(&once).expect("格式化结果应该是合法JSON");
        let twice = pretty_print(&reparsed, 2).expect("再次格式化应该成功");
        assert_eq!(once, twice, "格式化应该是幂等的");
    }

    #[test]
    fn test_validate_mirrors_parse() {
        assert!(validate(r#"{"ok": 1}"#).is_ok());
        assert!(validate(r#"{"ok": }"#).is_err());
        assert!(validate("").is_err(), "空文本不是合法JSON");
    }
}
