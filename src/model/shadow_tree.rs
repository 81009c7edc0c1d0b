//! 影子树：解析值的扁平导航索引，只存结构与路径，供宿主树形视图渲染

use serde::Serialize;
use serde_json::Value;

/// 字符串预览的最大字符数
const PREVIEW_LIMIT: usize = 40;

/// 节点类型（与渲染层解耦）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    /// 在父级中的键名或下标文本
    pub name: String,
    /// RFC 9535 JSONPath，用于精确寻址与回写
    pub path: String,
    pub kind: NodeKind,
    /// 子元素数量（对象字段数 / 数组长度）
    pub children: usize,
    /// 轻量预览（长字符串截断，复合值给规模提示）
    pub preview: String,
    /// 深度，用于缩进显示
    pub depth: usize,
    pub expanded: bool,
    pub visible: bool,
}

/// JSONPath 的末段：对象键或数组下标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// 从根值构建前序排列的全树索引
pub fn build_shadow_tree(root: &Value) -> Vec<TreeNode> {
    let mut out = Vec::new();
    walk(&mut out, root, "$", "$", 0);
    out
}

/// 根据展开状态刷新可见性：根节点恒可见，
/// 其余节点可见当且仅当全部祖先均已展开
pub fn apply_expansion_visibility(nodes: &mut [TreeNode]) {
    // 前序扁平序列里，截断到当前深度即得到祖先链的展开标记
    let mut expanded_chain: Vec<bool> = Vec::new();
    for node in nodes.iter_mut() {
        expanded_chain.truncate(node.depth);
        node.visible = expanded_chain.iter().all(|open| *open);
        expanded_chain.push(node.expanded);
    }
}

/// 拆出父路径与末段；根路径返回 None
///
/// 只处理本模块生成的具体路径形态：`$.key`、`$['key']`、`$[0]`，
/// 无法识别的形态同样返回 None，由调用方报错
pub fn split_parent(path: &str) -> Option<(String, PathSegment)> {
    let path = path.trim();
    if path == "$" {
        return None;
    }
    if let Some(stripped) = path.strip_suffix(']') {
        let open = stripped.rfind('[')?;
        let (parent, inner) = (&stripped[..open], stripped[open + 1..].trim());
        if parent.is_empty() {
            return None;
        }
        if let Ok(idx) = inner.parse::<usize>() {
            return Some((parent.to_string(), PathSegment::Index(idx)));
        }
        for quote in ['\'', '"'] {
            if inner.len() >= 2 && inner.starts_with(quote) && inner.ends_with(quote) {
                let key = inner[1..inner.len() - 1]
                    .replace("\\'", "'")
                    .replace("\\\"", "\"");
                return Some((parent.to_string(), PathSegment::Key(key)));
            }
        }
        return None;
    }
    let dot = path.rfind('.')?;
    let (parent, key) = (&path[..dot], &path[dot + 1..]);
    if parent.is_empty() || key.is_empty() {
        return None;
    }
    Some((parent.to_string(), PathSegment::Key(key.to_string())))
}

fn walk(out: &mut Vec<TreeNode>, value: &Value, path: &str, name: &str, depth: usize) {
    out.push(TreeNode {
        name: name.to_string(),
        path: path.to_string(),
        kind: kind_of(value),
        children: child_count(value),
        preview: preview_of(value),
        depth,
        expanded: false,
        visible: true,
    });
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = join_key(path, key);
                walk(out, child, &child_path, key, depth + 1);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                let child_path = format!("{}[{}]", path, idx);
                walk(out, child, &child_path, &format!("[{}]", idx), depth + 1);
            }
        }
        _ => {}
    }
}

fn kind_of(value: &Value) -> NodeKind {
    match value {
        Value::Object(_) => NodeKind::Object,
        Value::Array(_) => NodeKind::Array,
        Value::String(_) => NodeKind::String,
        Value::Number(_) => NodeKind::Number,
        Value::Bool(_) => NodeKind::Bool,
        Value::Null => NodeKind::Null,
    }
}

fn child_count(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 0,
    }
}

fn preview_of(value: &Value) -> String {
    match value {
        Value::String(s) => {
            if s.chars().count() > PREVIEW_LIMIT {
                let head: String = s.chars().take(PREVIEW_LIMIT).collect();
                format!("\"{}…\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Object(map) => format!("{{…}} {} 字段", map.len()),
        Value::Array(items) => format!("[…] {} 项", items.len()),
    }
}

/// 含特殊字符（或为空）的键使用 bracket-notation
fn join_key(parent: &str, key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        format!("{}.{}", parent, key)
    } else {
        format!("{}['{}']", parent, key.replace('\'', "\\'"))
    }
}
