//! Market trend analysis for the crops a farmer follows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cache::{Cache, ContentKey};
use crate::error::ASError;
use crate::fetcher::{Flow, RemoteContentFetcher};
use crate::flows::ContentTopic;
use crate::io::{HttpResponse, HttpRunner};
use crate::resolver::{ContentResolver, ResolvedContent};
use crate::schema::{FieldType, Schema};
use crate::Result;

#[derive(Builder, Clone, Debug)]
pub struct MarketTrendsArgs {
    pub crops: Vec<String>,
}

impl MarketTrendsArgs {
    pub fn builder() -> MarketTrendsArgsBuilder {
        MarketTrendsArgsBuilder::default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceDetail {
    /// Display price prefixed with the Rupee symbol, e.g. "₹2,100".
    pub price: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPrice {
    /// YYYY-MM-DD
    pub date: String,
    pub price: f64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropPriceAnalysis {
    pub crop_name: String,
    pub today: PriceDetail,
    pub tomorrow: PriceDetail,
    pub seven_day_average: String,
    pub summary: String,
    /// Two-word hint for a real image search, e.g. "wheat stalks".
    pub image_hint: String,
    pub historical_prices: Vec<HistoricalPrice>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct MarketTrendAnalysis {
    analysis: Vec<CropPriceAnalysis>,
}

fn flow() -> Flow {
    let price_detail = Schema::new().required("price", FieldType::String);
    let historical_price = Schema::new()
        .required("date", FieldType::String)
        .required("price", FieldType::Number);
    let crop_analysis = Schema::new()
        .required("cropName", FieldType::String)
        .required("today", FieldType::Object(price_detail.clone()))
        .required("tomorrow", FieldType::Object(price_detail))
        .required("sevenDayAverage", FieldType::String)
        .required("summary", FieldType::String)
        .required("imageHint", FieldType::String)
        .required(
            "historicalPrices",
            FieldType::Array(Box::new(FieldType::Object(historical_price))),
        );
    Flow::new(
        "market-trend-analysis",
        Schema::new().required(
            "analysis",
            FieldType::Array(Box::new(FieldType::Object(crop_analysis))),
        ),
    )
}

fn validate(args: &MarketTrendsArgs) -> Result<()> {
    if args.crops.is_empty() {
        return Err(
            ASError::ValidationError("At least one crop must be provided".to_string()).into(),
        );
    }
    if args.crops.iter().any(|crop| crop.trim().is_empty()) {
        return Err(ASError::ValidationError("Crop names cannot be empty".to_string()).into());
    }
    Ok(())
}

/// Placeholder analysis shown when the remote is unavailable and nothing is
/// cached for the crop.
pub fn fallback_analysis(crop: &str) -> CropPriceAnalysis {
    CropPriceAnalysis {
        crop_name: crop.to_string(),
        today: PriceDetail {
            price: "₹--".to_string(),
        },
        tomorrow: PriceDetail {
            price: "₹--".to_string(),
        },
        seven_day_average: "₹--".to_string(),
        summary: "Market data is currently unavailable.".to_string(),
        image_hint: format!("{} harvest", crop.to_lowercase()),
        historical_prices: Vec::new(),
    }
}

/// One analysis per crop, each under its own `market_<crop>` cache entry so
/// a crop added later does not invalidate the others.
pub fn analyze<R, C>(
    fetcher: &RemoteContentFetcher<R>,
    resolver: &ContentResolver<C>,
    args: &MarketTrendsArgs,
) -> Result<Vec<ResolvedContent<CropPriceAnalysis>>>
where
    R: HttpRunner<Response = HttpResponse>,
    C: Cache<ContentKey>,
{
    validate(args)?;
    let flow = flow();
    let mut results = Vec::new();
    for crop in &args.crops {
        let key = ContentKey::new(&format!("market_{}", crop), ContentTopic::MarketTrends);
        let resolved = resolver.resolve(
            &key,
            || {
                let payload = fetcher.fetch(&flow, &json!({ "crops": [crop] }))?;
                let output: MarketTrendAnalysis = serde_json::from_value(payload)
                    .map_err(|err| ASError::SchemaViolation(format!("{}: {}", flow.name(), err)))?;
                let mut analysis = output.analysis;
                if analysis.len() != 1 {
                    return Err(ASError::SchemaViolation(format!(
                        "{}: expected analysis for 1 crop, got {}",
                        flow.name(),
                        analysis.len()
                    ))
                    .into());
                }
                sort_historical_prices(&mut analysis[0])?;
                Ok(analysis.remove(0))
            },
            fallback_analysis(crop),
        )?;
        results.push(resolved);
    }
    Ok(results)
}

/// The remote lists the past seven days in whatever order the model chose.
/// Sort ascending so trend graphs read left to right. An unparseable date is
/// a malformed response, not something to guess around.
fn sort_historical_prices(analysis: &mut CropPriceAnalysis) -> Result<()> {
    let mut dated: Vec<(NaiveDate, HistoricalPrice)> = Vec::new();
    for price in &analysis.historical_prices {
        let date = NaiveDate::parse_from_str(&price.date, "%Y-%m-%d").map_err(|err| {
            ASError::SchemaViolation(format!(
                "historical price date {} is not YYYY-MM-DD: {}",
                price.date, err
            ))
        })?;
        dated.push((date, price.clone()));
    }
    dated.sort_by(|a, b| a.0.cmp(&b.0));
    analysis.historical_prices = dated.into_iter().map(|(_, price)| price).collect();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::resolver::Origin;
    use crate::test::utils::{config, MockRunner};
    use std::sync::Arc;

    fn analysis_body(crop: &str) -> String {
        format!(
            r#"{{"analysis":[{{
                "cropName":"{crop}",
                "today":{{"price":"₹2,150"}},
                "tomorrow":{{"price":"₹2,180"}},
                "sevenDayAverage":"₹2,120",
                "summary":"Prices are trending upwards this week.",
                "imageHint":"{crop} field",
                "historicalPrices":[
                    {{"date":"2024-05-03","price":2150}},
                    {{"date":"2024-05-01","price":2100}},
                    {{"date":"2024-05-02","price":2130}}
                ]
            }}]}}"#
        )
    }

    fn setup(responses: Vec<HttpResponse>) -> (Arc<MockRunner<HttpResponse>>, RemoteContentFetcher<MockRunner<HttpResponse>>) {
        let runner = Arc::new(MockRunner::new(responses));
        let fetcher = RemoteContentFetcher::new(runner.clone(), config());
        (runner, fetcher)
    }

    fn ok_response(body: String) -> HttpResponse {
        HttpResponse::builder().status(200).body(body).build().unwrap()
    }

    fn args(crops: &[&str]) -> MarketTrendsArgs {
        MarketTrendsArgs::builder()
            .crops(crops.iter().map(|c| c.to_string()).collect())
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_crop_list_is_validation_error() {
        let (_, fetcher) = setup(vec![]);
        let cache = InMemoryCache::default();
        let resolver = ContentResolver::new(&cache);
        let err = analyze(&fetcher, &resolver, &args(&[])).unwrap_err();
        match err.downcast_ref::<ASError>() {
            Some(ASError::ValidationError(msg)) => {
                assert!(msg.contains("At least one crop"))
            }
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_blank_crop_name_is_validation_error() {
        let (_, fetcher) = setup(vec![]);
        let cache = InMemoryCache::default();
        let resolver = ContentResolver::new(&cache);
        assert!(analyze(&fetcher, &resolver, &args(&["Wheat", " "])).is_err());
    }

    #[test]
    fn test_analysis_is_fetched_and_history_sorted() {
        let (runner, fetcher) = setup(vec![ok_response(analysis_body("Wheat"))]);
        let cache = InMemoryCache::default();
        let resolver = ContentResolver::new(&cache);
        let results = analyze(&fetcher, &resolver, &args(&["Wheat"])).unwrap();
        assert_eq!(1, results.len());
        assert_eq!(Origin::FreshFetch, results[0].origin);
        let analysis = &results[0].value;
        assert_eq!("Wheat", analysis.crop_name);
        let dates: Vec<&str> = analysis
            .historical_prices
            .iter()
            .map(|p| p.date.as_str())
            .collect();
        assert_eq!(vec!["2024-05-01", "2024-05-02", "2024-05-03"], dates);
        assert_eq!("http://localhost/market-trend-analysis", *runner.url());
        assert!(runner.request_body().contains("Wheat"));
    }

    #[test]
    fn test_second_read_within_ttl_makes_no_network_call() {
        let (runner, fetcher) = setup(vec![ok_response(analysis_body("Wheat"))]);
        let cache = InMemoryCache::default();
        let resolver = ContentResolver::new(&cache);
        analyze(&fetcher, &resolver, &args(&["Wheat"])).unwrap();
        let results = analyze(&fetcher, &resolver, &args(&["Wheat"])).unwrap();
        assert_eq!(Origin::FreshCache, results[0].origin);
        assert_eq!(1, *runner.run_count.borrow());
    }

    #[test]
    fn test_network_failure_serves_stale_analysis() {
        let failure = HttpResponse::builder()
            .status(-1)
            .body("connection reset".to_string())
            .build()
            .unwrap();
        let (_, fetcher) = setup(vec![failure, ok_response(analysis_body("Wheat"))]);
        let cache = InMemoryCache::default();
        let resolver = ContentResolver::new(&cache);
        analyze(&fetcher, &resolver, &args(&["Wheat"])).unwrap();
        cache.expire();
        let results = analyze(&fetcher, &resolver, &args(&["Wheat"])).unwrap();
        assert_eq!(Origin::StaleCache, results[0].origin);
        assert_eq!(
            "Prices are trending upwards this week.",
            results[0].value.summary
        );
    }

    #[test]
    fn test_failure_without_cache_serves_placeholder() {
        let failure = HttpResponse::builder()
            .status(500)
            .body("Internal Server Error".to_string())
            .build()
            .unwrap();
        let (_, fetcher) = setup(vec![failure]);
        let cache = InMemoryCache::default();
        let resolver = ContentResolver::new(&cache);
        let results = analyze(&fetcher, &resolver, &args(&["Wheat"])).unwrap();
        assert_eq!(Origin::StaticDefault, results[0].origin);
        assert_eq!("₹--", results[0].value.today.price);
        assert!(results[0].value.historical_prices.is_empty());
    }

    #[test]
    fn test_wrong_analysis_cardinality_degrades_to_placeholder() {
        let body = r#"{"analysis":[]}"#.to_string();
        let (_, fetcher) = setup(vec![ok_response(body)]);
        let cache = InMemoryCache::default();
        let resolver = ContentResolver::new(&cache);
        let results = analyze(&fetcher, &resolver, &args(&["Wheat"])).unwrap();
        assert_eq!(Origin::StaticDefault, results[0].origin);
    }

    #[test]
    fn test_unparseable_history_date_degrades_to_placeholder() {
        let body = analysis_body("Wheat").replace("2024-05-01", "May 1st");
        let (_, fetcher) = setup(vec![ok_response(body)]);
        let cache = InMemoryCache::default();
        let resolver = ContentResolver::new(&cache);
        let results = analyze(&fetcher, &resolver, &args(&["Wheat"])).unwrap();
        assert_eq!(Origin::StaticDefault, results[0].origin);
    }

    #[test]
    fn test_each_crop_has_its_own_cache_entry() {
        let (runner, fetcher) = setup(vec![
            ok_response(analysis_body("Rice")),
            ok_response(analysis_body("Wheat")),
        ]);
        let cache = InMemoryCache::default();
        let resolver = ContentResolver::new(&cache);
        let results = analyze(&fetcher, &resolver, &args(&["Wheat", "Rice"])).unwrap();
        assert_eq!(2, results.len());
        assert_eq!(2, *runner.run_count.borrow());
        // Wheat alone is now cached; only Rice was consumed from the queue.
        let results = analyze(&fetcher, &resolver, &args(&["Wheat"])).unwrap();
        assert_eq!(Origin::FreshCache, results[0].origin);
        assert_eq!(2, *runner.run_count.borrow());
    }
}
