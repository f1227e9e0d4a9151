use chrono::{Datelike, NaiveDateTime, Timelike};
use shared::domain::{Account, Transaction, TransactionKind};

use super::Fragment;

pub const CURRENCY: &str = "₽";

const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// `2019-03-10 03:20:41` becomes `10 марта 2019 г. в 03:20`. Unparseable input is
/// returned as is.
pub fn format_date(raw: &str) -> String {
    let Ok(at) = NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S") else {
        return raw.to_string();
    };
    format!(
        "{:02} {} {} г. в {:02}:{:02}",
        at.day(),
        MONTHS_GENITIVE[at.month0() as usize],
        at.year(),
        at.hour(),
        at.minute()
    )
}

pub fn format_sum(sum: f64) -> String {
    format!("{sum} {CURRENCY}")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn account_item(account: &Account) -> Fragment {
    let name = escape(&account.name);
    Fragment {
        id: Some(account.id.to_string()),
        markup: format!(
            r##"<li class="account" data-id="{id}"><a href="#"><span>{name}</span><span>{sum}</span></a></li>"##,
            id = account.id,
            sum = format_sum(account.sum),
        ),
        text: format!("{}: {}", account.name, format_sum(account.sum)),
    }
}

pub fn account_option(account: &Account) -> Fragment {
    Fragment {
        id: Some(account.id.to_string()),
        markup: format!(
            r#"<option value="{}">{}</option>"#,
            account.id,
            escape(&account.name)
        ),
        text: format!("[{}] {}", account.id, account.name),
    }
}

pub fn transaction_item(item: &Transaction) -> Fragment {
    let kind = item.kind.as_str();
    let date = format_date(&item.date);
    let markup = format!(
        r#"<div class="transaction transaction_{kind} row">
  <div class="col-md-7 transaction__details">
    <div class="transaction__icon"><span class="fa fa-money fa-2x"></span></div>
    <div class="transaction__info">
      <h4 class="transaction__title">{name}</h4>
      <div class="transaction__date">{date}</div>
    </div>
  </div>
  <div class="col-md-3">
    <div class="transaction__summ">{sum} <span class="currency">{CURRENCY}</span></div>
  </div>
  <div class="col-md-2 transaction__controls">
    <button class="btn btn-danger transaction__remove" data-id="{id}"><i class="fa fa-trash"></i></button>
  </div>
</div>"#,
        name = escape(&item.name),
        sum = item.sum,
        id = item.id,
    );
    let sign = match item.kind {
        TransactionKind::Income => '+',
        TransactionKind::Expense => '-',
    };
    Fragment {
        id: Some(item.id.to_string()),
        markup,
        text: format!(
            "[{}] {date}  {}  {sign}{}",
            item.id,
            item.name,
            format_sum(item.sum)
        ),
    }
}
