//! 商品列表的筛选条件构建
//!
//! 把原始查询参数整理成 [`FilterCriteria`]，再组合成与存储后端无关的
//! [`ProductQuery`]：所有条件之间为 AND，搜索词在名称与描述之间为 OR，
//! 始终按名称升序，分页窗口为闭区间 `[offset, offset + limit - 1]`。

use super::model::{ListProductsParams, Product};

/// 默认页码
pub const DEFAULT_PAGE: u64 = 1;
/// 默认每页条数，同时也是上限
pub const MAX_PAGE_SIZE: u64 = 1000;

/// 可参与筛选和排序的商品字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Category,
    Description,
    Store,
}

impl ProductField {
    /// 对应的表列名
    pub fn column(self) -> &'static str {
        match self {
            ProductField::Name => "nome",
            ProductField::Category => "categoria",
            ProductField::Description => "descricao",
            ProductField::Store => "loja",
        }
    }

    pub fn value_of(self, product: &Product) -> Option<&str> {
        match self {
            ProductField::Name => product.name.as_deref(),
            ProductField::Category => product.category.as_deref(),
            ProductField::Description => product.description.as_deref(),
            ProductField::Store => product.store.as_deref(),
        }
    }
}

/// 单个筛选条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// 精确相等
    Eq(ProductField, String),
    /// 不区分大小写的子串匹配，值中的 `%`、`_` 与 Postgres ILIKE 一样作为通配符
    ILike(ProductField, String),
    /// 任一子条件成立即可
    AnyOf(Vec<Condition>),
}

impl Condition {
    /// 在内存中对一条记录求值，空字段不匹配任何条件
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Condition::Eq(field, value) => field.value_of(product) == Some(value.as_str()),
            Condition::ILike(field, needle) => field
                .value_of(product)
                .map(|v| ilike(v, &format!("%{}%", needle)))
                .unwrap_or(false),
            Condition::AnyOf(conditions) => conditions.iter().any(|c| c.matches(product)),
        }
    }
}

/// 与后端无关的商品读取描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// 以 AND 组合
    pub conditions: Vec<Condition>,
    /// 升序排序字段
    pub order_by: ProductField,
    pub offset: u64,
    pub limit: u64,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        self.conditions.iter().all(|c| c.matches(product))
    }

    /// 分页窗口的最后一个下标（含）
    pub fn range_end(&self) -> u64 {
        self.offset.saturating_add(self.limit).saturating_sub(1)
    }
}

/// 单次请求的筛选条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub category: Option<String>,
    pub store: Option<String>,
    pub term: Option<String>,
    /// 同时作用于分类和店铺
    pub fuzzy: bool,
    pub page: u64,
    pub page_size: u64,
    /// 仅记录，不影响排序
    pub order_by: Option<String>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            category: None,
            store: None,
            term: None,
            fuzzy: false,
            page: DEFAULT_PAGE,
            page_size: MAX_PAGE_SIZE,
            order_by: None,
        }
    }
}

impl FilterCriteria {
    pub fn from_params(params: &ListProductsParams) -> Self {
        Self {
            category: clean(params.categoria.as_deref()),
            store: clean(params.loja.as_deref()),
            term: clean(params.termo.as_deref()),
            fuzzy: params
                .fuzzy
                .as_deref()
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            page: parse_positive(params.page.as_deref()).unwrap_or(DEFAULT_PAGE),
            page_size: parse_positive(params.limit.as_deref())
                .unwrap_or(MAX_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
            order_by: params.order_by.clone(),
        }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn to_query(&self) -> ProductQuery {
        let mut conditions = Vec::new();

        if let Some(category) = &self.category {
            conditions.push(self.match_field(ProductField::Category, category));
        }
        if let Some(store) = &self.store {
            conditions.push(self.match_field(ProductField::Store, store));
        }
        // 搜索词不受 fuzzy 影响，始终做子串匹配
        if let Some(term) = &self.term {
            conditions.push(Condition::AnyOf(vec![
                Condition::ILike(ProductField::Name, term.clone()),
                Condition::ILike(ProductField::Description, term.clone()),
            ]));
        }

        ProductQuery {
            conditions,
            order_by: ProductField::Name,
            offset: self.offset(),
            limit: self.page_size,
        }
    }

    fn match_field(&self, field: ProductField, value: &str) -> Condition {
        if self.fuzzy {
            Condition::ILike(field, value.to_string())
        } else {
            Condition::Eq(field, value.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    /// `%`
    Any,
    /// `_`
    One,
    Char(char),
}

fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::Any,
            '_' => LikeToken::One,
            // 末尾的反斜杠按字面量处理
            '\\' => LikeToken::Char(chars.next().unwrap_or('\\')),
            c => LikeToken::Char(c),
        });
    }
    tokens
}

/// 按 ILIKE 规则匹配：`%` 任意长度，`_` 单个字符，`\` 转义，不区分大小写
pub fn ilike(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let tokens = like_tokens(&pattern.to_lowercase());

    let (mut t, mut p) = (0, 0);
    // 最近一个 `%` 之后的模式位置，以及它当前吞到的文本位置
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(LikeToken::Any) => {
                backtrack = Some((p + 1, t));
                p += 1;
            }
            Some(LikeToken::One) => {
                t += 1;
                p += 1;
            }
            Some(LikeToken::Char(c)) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((bp, bt)) => {
                    p = bp;
                    t = bt + 1;
                    backtrack = Some((bp, bt + 1));
                }
                None => return false,
            },
        }
    }

    tokens[p..].iter().all(|token| *token == LikeToken::Any)
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// 读取开头的整数部分（`"20abc"` → 20，`"2.5"` → 2），负数、0 或没有数字视为无效
fn parse_positive(value: Option<&str>) -> Option<u64> {
    let value = value?.trim_start();
    let value = value.strip_prefix('+').unwrap_or(value);
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let digits = &value[..end];
    if digits.is_empty() {
        return None;
    }

    let n = digits.parse::<u64>().unwrap_or(u64::MAX);
    (n > 0).then_some(n)
}
