//! Common regex patterns for Chinese VAT invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Header phrases that introduce the goods/services column, longest first.
pub const ITEM_HEADERS: [&str; 4] = [
    "货物或应税劳务、服务名称",
    "货物或应税劳务名称",
    "项目名称",
    "商品名称",
];

/// Markers that end the line-item table.
pub const ITEM_TERMINATORS: [&str; 4] = ["合计", "小写", "大写", "备注"];

/// Column headers of the line-item table, longest first so that compound
/// headers are removed before their parts.
pub const COLUMN_HEADERS: [&str; 12] = [
    "规格型号", "征收率", "规格", "型号", "单位", "数量", "单价", "金额", "税率", "税额",
    "序号", "No",
];

/// Prefixes that turn a `名称` label into an item header rather than a party name.
pub const ITEM_NAME_PREFIXES: [&str; 4] = ["项目", "商品", "服务", "劳务"];

lazy_static! {
    // Invoice number: label required, digits only
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)(?:发票号码|發票號碼|invoice\s*no\.?)[\s:：]*(\d+)"
    ).unwrap();

    // Dates
    pub static ref LABELED_DATE: Regex = Regex::new(
        r"(?:开票日期|发票日期)[\s:：]*(\d{4})\s*(?:年|[-/])\s*(\d{1,2})\s*(?:月|[-/])\s*(\d{1,2})"
    ).unwrap();

    pub static ref LABELED_DATE_COMPACT: Regex = Regex::new(
        r"(?:开票日期|发票日期)[\s:：]*(\d{8,})"
    ).unwrap();

    pub static ref BARE_DATE_CJK: Regex = Regex::new(
        r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日"
    ).unwrap();

    pub static ref DATE_FULL: Regex = Regex::new(
        r"^\s*(\d{4})\s*(?:年|[-/])\s*(\d{1,2})\s*(?:月|[-/])\s*(\d{1,2})\s*日?\s*$"
    ).unwrap();

    pub static ref DATE_COMPACT_FULL: Regex = Regex::new(
        r"^\s*(\d{4})(\d{2})(\d{2})\s*$"
    ).unwrap();

    // Buyer: a run of up to 40 characters on one line ending in an organizational
    // suffix. The run never crosses a colon, so a second `名称：` label ends it.
    pub static ref BUYER_BLOCK_NAME: Regex = Regex::new(
        r"购买方[^\n]{0,20}?名\s*称[\s:：]*([^\n:：]{1,40}(?:公司|集团|中心|店|厂))"
    ).unwrap();

    pub static ref NAME_LABEL: Regex = Regex::new(
        r"名\s*称[\s:：]*([^\n:：]{1,40}(?:公司|集团|中心|店|厂))"
    ).unwrap();

    pub static ref BUYER_LABEL: Regex = Regex::new(
        r"购买方[\s:：]*([^\n:：]{1,40}(?:公司|集团|中心|店|厂))"
    ).unwrap();

    // Start of the seller's columns on a side-by-side buyer/seller line
    pub static ref PARTY_BREAK: Regex = Regex::new(
        r"销售方|\s销\s|名\s*称"
    ).unwrap();

    pub static ref NAME_WITH_SUFFIX: Regex = Regex::new(
        r"^[^\n]*(?:公司|集团|中心|店|厂)"
    ).unwrap();

    pub static ref NON_NAME_CHARS: Regex = Regex::new(
        r"[^\p{Han}\p{Latin}\p{Nd}]"
    ).unwrap();

    // Line items
    pub static ref ITEM_HEADER_INLINE: Regex = Regex::new(
        r"(?:货物或应税劳务、服务名称|货物或应税劳务名称|项目名称|商品名称)[ \t]*[:：]?[ \t]*([^\n]+)"
    ).unwrap();

    // Totals, strongest label first
    pub static ref TOTAL_LABELS: Vec<Regex> = [
        r"价税合计\s*[（(]\s*小写\s*[）)]\s*[:：]?\s*[¥￥]?\s*(\d[\d,，.]*)",
        r"[（(]\s*小写\s*[）)]\s*[:：]?\s*[¥￥]?\s*(\d[\d,，.]*)",
        r"价税合计\s*[:：]?\s*[¥￥]?\s*(\d[\d,，.]*)",
        r"合\s*计\s*[:：]?\s*[¥￥]?\s*(\d[\d,，.]*)",
        r"总\s*计\s*[:：]?\s*[¥￥]?\s*(\d[\d,，.]*)",
        r"(?i)total\s*[:：]?\s*[¥￥]?\s*(\d[\d,，.]*)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect();

    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(
        r"[¥￥]\s*(\d[\d,，.]*)"
    ).unwrap();

    pub static ref DECIMAL_CANDIDATE: Regex = Regex::new(
        r"\d[\d,]*\.\d{2}"
    ).unwrap();

    pub static ref GROUPED_DECIMAL: Regex = Regex::new(
        r"^(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}$"
    ).unwrap();
}
