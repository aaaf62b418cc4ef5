// ==========================================
// 课程模板实例化引擎 - URL slug 生成
// ==========================================
// 规则: 小写 → 剔除 [a-z0-9]、'-'、空白以外的字符
//       → 空白折叠为单个 '-' → 连续 '-' 折叠
// 首尾不保留 '-'；结果为空时回退为 FALLBACK_SLUG
// ==========================================

/// 标题中不含任何可用字符时的回退值
pub const FALLBACK_SLUG: &str = "assessment";

/// 由标题生成 URL slug（确定性、幂等）
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
