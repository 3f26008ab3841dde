//! Keyword-based intent resolution.
//!
//! A prompt is lowercased and checked against an ordered table of rules; the
//! first rule whose keywords all appear (as substrings) wins. Prompts that
//! match no rule fall back to a product-name search using the prompt's first
//! word.
//!
//! | # | Keywords                                        | Intent                 |
//! |---|-------------------------------------------------|------------------------|
//! | 1 | `top` + (`order`\|`sale`) + (`revenue`\|`price`) | [`Intent::RevenueRanking`] |
//! | 2 | `top` + (`order`\|`sale`)                        | [`Intent::OrderCountRanking`] |
//! | 3 | `customer` + `city`                              | [`Intent::CustomersByCity`] |
//! | 4 | `customer`                                      | [`Intent::CustomersBySignup`] |
//! | 5 | `product`                                       | [`Intent::ProductsByPrice`] |
//! | 6 | `recent` \| `latest`                             | [`Intent::RecentOrders`] |
//! | - | anything else                                   | [`Intent::ProductSearch`] |
//!
//! The search fallback binds its term as a query parameter instead of
//! splicing it into the SQL text, so quotes in a prompt cannot change the
//! statement. `%`, `_` and `\` in the term are escaped, making the match a
//! literal, case-insensitive substring test.

use serde::Serialize;

/// Search term used when the prompt has no words at all.
pub const DEFAULT_SEARCH_TERM: &str = "laptop";

/// Escape character declared in the search template's `LIKE ... ESCAPE` clause.
pub const LIKE_ESCAPE: char = '\\';

pub const REVENUE_RANKING_SQL: &str = "SELECT o.product_name, SUM(o.price * o.quantity) as total_revenue FROM orders o GROUP BY o.product_name ORDER BY total_revenue DESC LIMIT 10;";
pub const ORDER_COUNT_RANKING_SQL: &str = "SELECT o.product_name, COUNT(*) as order_count FROM orders o GROUP BY o.product_name ORDER BY order_count DESC LIMIT 10;";
pub const CUSTOMERS_BY_CITY_SQL: &str = "SELECT city, COUNT(*) as customer_count FROM customers GROUP BY city ORDER BY customer_count DESC;";
pub const CUSTOMERS_BY_SIGNUP_SQL: &str = "SELECT * FROM customers ORDER BY signup_date DESC;";
pub const PRODUCTS_BY_PRICE_SQL: &str = "SELECT * FROM products ORDER BY price DESC;";
pub const RECENT_ORDERS_SQL: &str = "SELECT c.name, o.product_name, o.price, o.order_date FROM orders o JOIN customers c ON o.customer_id = c.id ORDER BY o.order_date DESC LIMIT 10;";
pub const PRODUCT_SEARCH_SQL: &str = "SELECT * FROM orders WHERE product_name LIKE '%' || ? || '%' ESCAPE '\\' LIMIT 10;";

/// The query family a prompt was mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Products ranked by summed `price * quantity`.
    RevenueRanking,
    /// Products ranked by number of orders.
    OrderCountRanking,
    /// Customer counts per city.
    CustomersByCity,
    /// All customers, newest signup first.
    CustomersBySignup,
    /// All products, most expensive first.
    ProductsByPrice,
    /// Latest orders joined with the ordering customer.
    RecentOrders,
    /// Orders whose product name contains a search term.
    ProductSearch,
}

impl Intent {
    /// The SQL template for this intent.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::RevenueRanking => REVENUE_RANKING_SQL,
            Self::OrderCountRanking => ORDER_COUNT_RANKING_SQL,
            Self::CustomersByCity => CUSTOMERS_BY_CITY_SQL,
            Self::CustomersBySignup => CUSTOMERS_BY_SIGNUP_SQL,
            Self::ProductsByPrice => PRODUCTS_BY_PRICE_SQL,
            Self::RecentOrders => RECENT_ORDERS_SQL,
            Self::ProductSearch => PRODUCT_SEARCH_SQL,
        }
    }

    /// Short human-readable description.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RevenueRanking => "Top products by revenue",
            Self::OrderCountRanking => "Top products by order count",
            Self::CustomersByCity => "Customers per city",
            Self::CustomersBySignup => "Customers by signup date",
            Self::ProductsByPrice => "Products by price",
            Self::RecentOrders => "Most recent orders",
            Self::ProductSearch => "Orders matching a product name",
        }
    }
}

/// One entry of the ordered rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub intent: Intent,
    predicate: fn(&str) -> bool,
}

impl Rule {
    /// Whether this rule accepts an already-lowercased prompt.
    #[must_use]
    pub fn matches(&self, lowered: &str) -> bool {
        (self.predicate)(lowered)
    }
}

fn ranks_orders(p: &str) -> bool {
    p.contains("top") && (p.contains("order") || p.contains("sale"))
}

/// Rules in evaluation order. Earlier rules shadow later ones.
pub const RULES: &[Rule] = &[
    Rule {
        intent: Intent::RevenueRanking,
        predicate: |p| ranks_orders(p) && (p.contains("revenue") || p.contains("price")),
    },
    Rule {
        intent: Intent::OrderCountRanking,
        predicate: ranks_orders,
    },
    Rule {
        intent: Intent::CustomersByCity,
        predicate: |p| p.contains("customer") && p.contains("city"),
    },
    Rule {
        intent: Intent::CustomersBySignup,
        predicate: |p| p.contains("customer"),
    },
    Rule {
        intent: Intent::ProductsByPrice,
        predicate: |p| p.contains("product"),
    },
    Rule {
        intent: Intent::RecentOrders,
        predicate: |p| p.contains("recent") || p.contains("latest"),
    },
];

/// A prompt resolved to SQL plus any bound parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedQuery {
    pub intent: Intent,
    /// SQL text; `?` marks a bound parameter.
    pub sql: &'static str,
    /// Values for the `?` placeholders, in order.
    pub params: Vec<String>,
}

impl ResolvedQuery {
    /// A query for one of the parameterless templates.
    #[must_use]
    pub fn fixed(intent: Intent) -> Self {
        Self {
            intent,
            sql: intent.sql(),
            params: Vec::new(),
        }
    }

    /// A product-name search for `term`, matched literally.
    #[must_use]
    pub fn product_search(term: &str) -> Self {
        Self {
            intent: Intent::ProductSearch,
            sql: PRODUCT_SEARCH_SQL,
            params: vec![escape_like(term)],
        }
    }

    /// The SQL with each parameter inlined as a quoted literal.
    ///
    /// For display and history only; execution always binds `params`.
    #[must_use]
    pub fn display_sql(&self) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let mut params = self.params.iter();
        let mut pieces = self.sql.split('?');
        if let Some(first) = pieces.next() {
            out.push_str(first);
        }
        for piece in pieces {
            match params.next() {
                Some(value) => {
                    out.push('\'');
                    out.push_str(&value.replace('\'', "''"));
                    out.push('\'');
                }
                None => out.push('?'),
            }
            out.push_str(piece);
        }
        out
    }
}

/// Map a prompt to a query. Total and deterministic.
#[must_use]
pub fn resolve(prompt: &str) -> ResolvedQuery {
    let lowered = prompt.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map_or_else(
            || ResolvedQuery::product_search(search_term(prompt)),
            |rule| ResolvedQuery::fixed(rule.intent),
        )
}

/// First whitespace-delimited word of the prompt, taken as written.
///
/// Case is left alone (`LIKE` ignores ASCII case) and so is punctuation, so
/// `"laptops?"` searches for `laptops?` and matches nothing in the seed data.
#[must_use]
pub fn search_term(prompt: &str) -> &str {
    prompt.split_whitespace().next().unwrap_or(DEFAULT_SEARCH_TERM)
}

/// Escape `LIKE` wildcards so `term` only matches itself.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revenue_keywords_win_regardless_of_other_words() {
        for prompt in [
            "top order revenue",
            "Show the TOP orders by Revenue please",
            "revenue of top orders for each customer in every city",
            "which products are top in orders and recent revenue",
        ] {
            assert_eq!(resolve(prompt).sql, REVENUE_RANKING_SQL, "{prompt}");
        }
    }

    #[test]
    fn test_price_also_selects_revenue() {
        assert_eq!(resolve("top sales by price").intent, Intent::RevenueRanking);
    }

    #[test]
    fn test_top_orders_without_revenue_counts() {
        assert_eq!(resolve("top sellers in sales").intent, Intent::OrderCountRanking);
        assert_eq!(resolve("Top 5 orders").sql, ORDER_COUNT_RANKING_SQL);
    }

    #[test]
    fn test_top_alone_is_not_ranking() {
        assert_eq!(resolve("top customers").intent, Intent::CustomersBySignup);
    }

    #[test]
    fn test_rule_order_top_beats_customer() {
        let resolved = resolve("top customer orders");
        assert_eq!(resolved.intent, Intent::OrderCountRanking);
        assert_ne!(resolved.sql, CUSTOMERS_BY_SIGNUP_SQL);
    }

    #[test]
    fn test_customer_rules() {
        assert_eq!(
            resolve("Show customer distribution by city").sql,
            CUSTOMERS_BY_CITY_SQL
        );
        assert_eq!(
            resolve("List all customers from New York").sql,
            CUSTOMERS_BY_SIGNUP_SQL
        );
    }

    #[test]
    fn test_product_rule() {
        assert_eq!(
            resolve("Display highest priced products").sql,
            PRODUCTS_BY_PRICE_SQL
        );
    }

    #[test]
    fn test_products_by_revenue_without_order_keyword() {
        // Neither "order" nor "sale" appears, so the ranking rules do not fire.
        assert_eq!(
            resolve("Show top 10 products by revenue").intent,
            Intent::ProductsByPrice
        );
    }

    #[test]
    fn test_recent_rule() {
        assert_eq!(
            resolve("Find recent orders in the last month").sql,
            RECENT_ORDERS_SQL
        );
        assert_eq!(resolve("latest purchases").intent, Intent::RecentOrders);
    }

    #[test]
    fn test_customer_beats_recent() {
        assert_eq!(resolve("recent customers").intent, Intent::CustomersBySignup);
    }

    #[test]
    fn test_empty_prompts_search_default_term() {
        for prompt in ["", " ", "\t\n  "] {
            let resolved = resolve(prompt);
            assert_eq!(resolved.intent, Intent::ProductSearch);
            assert_eq!(resolved.params, vec![DEFAULT_SEARCH_TERM.to_string()]);
        }
    }

    #[test]
    fn test_fallback_uses_first_word_verbatim() {
        let resolved = resolve("Monitor stuff");
        assert_eq!(resolved.sql, PRODUCT_SEARCH_SQL);
        assert_eq!(resolved.params, vec!["Monitor".to_string()]);
        assert_eq!(search_term("  laptops? please"), "laptops?");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        for prompt in ["top orders", "", "webcam", "customer city", "anything else"] {
            assert_eq!(resolve(prompt), resolve(prompt));
        }
    }

    #[test]
    fn test_every_rule_is_reachable() {
        let prompts = [
            "top order revenue",
            "top order",
            "customer city",
            "customer",
            "product",
            "recent",
        ];
        for (rule, prompt) in RULES.iter().zip(prompts) {
            assert!(rule.matches(prompt));
            assert_eq!(resolve(prompt).intent, rule.intent);
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("laptop"), "laptop");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }

    #[test]
    fn test_display_sql_inlines_quoted_param() {
        let resolved = resolve("O'Brien");
        assert_eq!(
            resolved.display_sql(),
            "SELECT * FROM orders WHERE product_name LIKE '%' || 'O''Brien' || '%' ESCAPE '\\' LIMIT 10;"
        );
        assert_eq!(
            ResolvedQuery::fixed(Intent::ProductsByPrice).display_sql(),
            PRODUCTS_BY_PRICE_SQL
        );
    }
}
