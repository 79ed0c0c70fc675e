use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};

use crate::bot::AppContext;
use crate::fetch::weather::WeatherReport;
use crate::fetch::FetchError;
use crate::handler::FetchHandler;
use crate::reply::Reply;
use crate::router::Call;

pub const USAGE: &str = "usage: /weather <location>";

fn emoji_for(condition: &str) -> Option<&'static str> {
    match condition {
        "Clear" => Some("\u{2600}"),
        "Clouds" => Some("\u{2601}"),
        "Rain" | "Drizzle" => Some("\u{2614}"),
        "Thunderstorm" => Some("\u{26A1}"),
        "Snow" => Some("\u{1F328}"),
        "Mist" => Some("\u{1F32B}"),
        _ => None,
    }
}

fn to_local<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Result<DateTime<Tz>, FetchError> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|utc| utc.with_timezone(tz))
        .ok_or_else(|| FetchError::Decode(format!("timestamp out of range: {}", timestamp)))
}

/// `H:MM:SS`
fn day_length(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Render a report with sun times shown in `tz`.
pub fn format_report<Tz>(
    report: &WeatherReport,
    now: DateTime<Tz>,
    tz: &Tz,
) -> Result<String, FetchError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let condition = report.condition()?;
    let described = match emoji_for(condition) {
        Some(emoji) => format!("{}{}", condition, emoji),
        None => condition.to_string(),
    };
    let sunrise = to_local(report.sys.sunrise, tz)?;
    let sunset = to_local(report.sys.sunset, tz)?;

    Ok(format!(
        "*** {} ***\n\
         location: {}\n\
         temperature: {}°C {}\n\
         humidity: {}%\n\
         pressure: {} hPa\n\
         Wind: {} m/s\n\
         sunrise: {}\n\
         sunset: {}\n\
         day length: {}\n",
        now.format("%Y-%m-%d %H:%M"),
        report.name,
        report.main.temp,
        described,
        report.main.humidity,
        report.main.pressure,
        report.wind.speed,
        sunrise.format("%Y-%m-%d %H:%M:%S"),
        sunset.format("%Y-%m-%d %H:%M:%S"),
        day_length(report.sys.sunset - report.sys.sunrise),
    ))
}

/// `/weather <location>`
pub struct Forecast;

#[async_trait]
impl FetchHandler for Forecast {
    type Data = WeatherReport;

    async fn fetch(&self, ctx: &AppContext, call: &Call) -> Result<WeatherReport, FetchError> {
        let location = call.args.get(0).ok_or(FetchError::Missing("location"))?;
        ctx.weather.current(location).await
    }

    fn format(
        &self,
        _ctx: &AppContext,
        _call: &Call,
        report: WeatherReport,
    ) -> Result<Reply, FetchError> {
        let text = format_report(&report, Local::now(), &Local)?;
        Ok(Reply::text(text).quoted())
    }
}
