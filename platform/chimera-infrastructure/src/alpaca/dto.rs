//! Wire shapes of the Alpaca trading (v2) and crypto market data (v1beta3)
//! endpoints, and their conversion into domain values.
//!
//! Alpaca encodes most decimals as JSON strings; the deserializers here accept
//! either form.

use chimera_domain::value_objects::bar::Bar;
use chimera_domain::value_objects::order::ClosedOrder;
use chimera_domain::value_objects::position::OpenPosition;
use chimera_domain::value_objects::side::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

#[derive(Deserialize)]
#[serde(untagged)]
enum Decimal {
    Text(String),
    Number(f64),
}

impl Decimal {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Decimal::Number(value) => Ok(value),
            Decimal::Text(raw) => raw
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid decimal: {raw:?}"))),
        }
    }
}

fn de_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Decimal::deserialize(deserializer)?.into_f64()
}

fn de_opt_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Decimal>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Decimal::Text(raw)) if raw.trim().is_empty() => Ok(None),
        Some(value) => value.into_f64().map(Some),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountDto {
    #[serde(deserialize_with = "de_decimal")]
    pub equity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionDto {
    pub symbol: String,
    #[serde(deserialize_with = "de_decimal")]
    pub qty: f64,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub avg_entry_price: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub unrealized_pl: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub unrealized_plpc: Option<f64>,
}

impl From<PositionDto> for OpenPosition {
    fn from(dto: PositionDto) -> Self {
        OpenPosition {
            symbol: dto.symbol,
            quantity: dto.qty,
            avg_entry_price: dto.avg_entry_price.unwrap_or(0.0),
            unrealized_pnl: dto.unrealized_pl.unwrap_or(0.0),
            unrealized_pnl_fraction: dto.unrealized_plpc.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BarDto {
    pub t: DateTime<Utc>,
    #[serde(deserialize_with = "de_decimal")]
    pub o: f64,
    #[serde(deserialize_with = "de_decimal")]
    pub h: f64,
    #[serde(deserialize_with = "de_decimal")]
    pub l: f64,
    #[serde(deserialize_with = "de_decimal")]
    pub c: f64,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub v: Option<f64>,
}

impl BarDto {
    pub fn into_bar(self, symbol: &str) -> Bar {
        Bar {
            symbol: symbol.to_string(),
            timestamp: self.t.timestamp(),
            open: self.o,
            high: self.h,
            low: self.l,
            close: self.c,
            volume: self.v.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BarsPage {
    #[serde(default)]
    pub bars: HashMap<String, Vec<BarDto>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl BarsPage {
    /// Bars for `symbol` on this page, converted and in wire order.
    pub fn take_bars(&mut self, symbol: &str) -> Vec<Bar> {
        self.bars
            .remove(symbol)
            .unwrap_or_default()
            .into_iter()
            .map(|dto| dto.into_bar(symbol))
            .collect()
    }

    pub fn next_token(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderDto {
    pub side: Side,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub filled_qty: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub filled_avg_price: Option<f64>,
    #[serde(default)]
    pub filled_at: Option<DateTime<Utc>>,
}

/// Converts each listed order on its own; one malformed entry only drops itself.
pub fn decode_orders(values: Vec<serde_json::Value>) -> Vec<ClosedOrder> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<OrderDto>(value) {
            Ok(order) => Some(ClosedOrder::from(order)),
            Err(err) => {
                tracing::debug!(index, error = %err, "skipping undecodable order");
                None
            }
        })
        .collect()
}

impl From<OrderDto> for ClosedOrder {
    fn from(dto: OrderDto) -> Self {
        ClosedOrder {
            side: dto.side,
            filled_qty: dto.filled_qty.unwrap_or(0.0),
            filled_avg_price: dto.filled_avg_price,
            filled_at: dto.filled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn account_equity_accepts_string_and_number() {
        let text: AccountDto = serde_json::from_str(r#"{"equity":"100234.56","cash":"1.0"}"#).unwrap();
        assert_eq!(text.equity, 100234.56);
        let number: AccountDto = serde_json::from_str(r#"{"equity":99.5}"#).unwrap();
        assert_eq!(number.equity, 99.5);
        assert!(serde_json::from_str::<AccountDto>(r#"{"equity":"n/a"}"#).is_err());
    }

    #[test]
    fn position_maps_pnl_fields() {
        let dto: PositionDto = serde_json::from_str(
            r#"{"symbol":"BTCUSD","qty":"0.0345","avg_entry_price":"62000",
                "unrealized_pl":"-150.25","unrealized_plpc":"-0.012","side":"long"}"#,
        )
        .unwrap();
        let position = OpenPosition::from(dto);
        assert_eq!(position.symbol, "BTCUSD");
        assert_eq!(position.quantity, 0.0345);
        assert_eq!(position.unrealized_pnl, -150.25);
        assert_eq!(position.unrealized_pnl_fraction, -0.012);
    }

    #[test]
    fn bars_page_parses_symbol_map_and_token() {
        let mut page: BarsPage = serde_json::from_str(
            r#"{"bars":{"BTC/USD":[
                {"t":"2024-01-04T00:00:00Z","o":42000.5,"h":43000,"l":41000,"c":42500,"v":12.5,"n":10,"vw":42400},
                {"t":"2024-01-05T00:00:00Z","o":42500,"h":44000,"l":42000,"c":43900,"v":8}
            ]},"next_page_token":"abc"}"#,
        )
        .unwrap();
        assert_eq!(page.next_token(), Some("abc"));
        let bars = page.take_bars("BTC/USD");
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap().timestamp());
        assert_eq!(bars[1].close, 43900.0);
        assert_eq!(bars[0].symbol, "BTC/USD");
    }

    #[test]
    fn empty_bars_page_has_no_token() {
        let mut page: BarsPage = serde_json::from_str(r#"{"bars":{},"next_page_token":null}"#).unwrap();
        assert!(page.take_bars("BTC/USD").is_empty());
        assert_eq!(page.next_token(), None);
    }

    #[test]
    fn orders_tolerate_unfilled_fields() {
        let orders: Vec<OrderDto> = serde_json::from_str(
            r#"[{"side":"buy","filled_qty":"0.01","filled_avg_price":"61234.56","filled_at":"2024-01-05T14:30:00Z"},
                {"side":"sell","filled_qty":"0","filled_avg_price":null,"filled_at":null}]"#,
        )
        .unwrap();
        let orders: Vec<ClosedOrder> = orders.into_iter().map(ClosedOrder::from).collect();
        assert_eq!(orders[0].side, Side::Buy);
        assert_eq!(orders[0].filled_avg_price, Some(61234.56));
        assert_eq!(
            orders[0].filled_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 5, 14, 30, 0).unwrap())
        );
        assert_eq!(orders[1].side, Side::Sell);
        assert_eq!(orders[1].filled_avg_price, None);
        assert_eq!(orders[1].filled_at, None);
    }

    #[test]
    fn one_malformed_order_keeps_the_rest() {
        let values: Vec<serde_json::Value> = serde_json::from_str(
            r#"[{"side":"buy","filled_qty":"0.01","filled_avg_price":"61234.56","filled_at":"2024-01-05T14:30:00Z"},
                {"side":"buy","filled_qty":"lots","filled_avg_price":"1","filled_at":"2024-01-05T13:00:00Z"},
                {"side":"short","filled_qty":"1"},
                {"side":"sell","filled_qty":"0.5","filled_avg_price":60000,"filled_at":"2024-01-04T09:15:00Z"}]"#,
        )
        .unwrap();
        let orders = decode_orders(values);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].side, Side::Buy);
        assert_eq!(orders[0].filled_qty, 0.01);
        assert_eq!(orders[1].side, Side::Sell);
        assert_eq!(orders[1].filled_avg_price, Some(60000.0));
    }
}
