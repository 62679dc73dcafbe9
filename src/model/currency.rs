use serde::{Deserialize, Serialize};

/// Currency viewers donate in. Drives prompt wording and money display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Krw,
    Usd,
    Eur,
    Jpy,
    Gbp,
    Cny,
}

/// Regional flavour handed to the model alongside the currency.
pub struct CurrencyInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub region: &'static str,
    pub locale: &'static str,
    pub small_donation: &'static str,
    pub medium_donation: &'static str,
    pub big_donation: &'static str,
    pub username_style: &'static str,
}

impl Currency {
    pub const ALL: [Currency; 6] = [
        Currency::Krw,
        Currency::Usd,
        Currency::Eur,
        Currency::Jpy,
        Currency::Gbp,
        Currency::Cny,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Krw => "KRW",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
            Currency::Gbp => "GBP",
            Currency::Cny => "CNY",
        }
    }

    pub fn info(&self) -> CurrencyInfo {
        match self {
            Currency::Krw => CurrencyInfo {
                symbol: "₩",
                name: "원",
                region: "한국",
                locale: "Korean",
                small_donation: "1,000~10,000",
                medium_donation: "10,000~50,000",
                big_donation: "100,000~1,000,000",
                username_style: "Korean-style nicknames (예: 감자탕조아, 방탄소녀단, 크크크123)",
            },
            Currency::Usd => CurrencyInfo {
                symbol: "$",
                name: "달러",
                region: "미국/국제",
                locale: "International/English-speaking",
                small_donation: "1~10",
                medium_donation: "10~50",
                big_donation: "100~1,000",
                username_style: "English usernames (e.g., CoolGamer99, ShadowKnight, xXDragonXx)",
            },
            Currency::Eur => CurrencyInfo {
                symbol: "€",
                name: "유로",
                region: "유럽",
                locale: "European",
                small_donation: "1~10",
                medium_donation: "10~50",
                big_donation: "100~1,000",
                username_style: "European-style usernames (e.g., HansGamer, Pierre_FR, Luigi_IT)",
            },
            Currency::Jpy => CurrencyInfo {
                symbol: "¥",
                name: "엔",
                region: "일본",
                locale: "Japanese",
                small_donation: "100~1,000",
                medium_donation: "1,000~5,000",
                big_donation: "10,000~100,000",
                username_style: "Japanese-style usernames (e.g., たけし_gamer, sakura123, アニメ大好き)",
            },
            Currency::Gbp => CurrencyInfo {
                symbol: "£",
                name: "파운드",
                region: "영국",
                locale: "British",
                small_donation: "1~10",
                medium_donation: "10~50",
                big_donation: "100~1,000",
                username_style: "British-style usernames (e.g., TeaLover99, LondonGamer, CheekyNandos)",
            },
            Currency::Cny => CurrencyInfo {
                symbol: "¥",
                name: "위안",
                region: "중국",
                locale: "Chinese",
                small_donation: "5~50",
                medium_donation: "50~300",
                big_donation: "500~5,000",
                username_style: "Chinese-style usernames (e.g., 小龙_gamer, 熊猫123, 大神来了)",
            },
        }
    }

    /// `₩5,000`, `$12`: the compact form used in the chat overlay.
    pub fn format_symbol(&self, amount: u64) -> String {
        format!("{}{}", self.info().symbol, group_thousands(amount))
    }

    /// Long form used in summaries: KRW reads `5,000원`, the rest use the symbol.
    pub fn format_money(&self, amount: u64) -> String {
        match self {
            Currency::Krw => format!("{}원", group_thousands(amount)),
            _ => self.format_symbol(amount),
        }
    }
}

pub fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
