//! Weather tool set: lookups over a canned city database.
//!
//! The database is deterministic; there is no network access. City lookup
//! is case-insensitive.

use crate::mcp::content::ReturnValue;
use crate::mcp::property::{Property, PropertyList, SchemaError};
use crate::mcp::server::{McpServer, MessageSink, ServerInfo};

/// One city's weather record.
struct CityWeather {
    city: &'static str,
    country: &'static str,
    temperature: f64,
    humidity: f64,
    pressure: f64,
    condition: &'static str,
    description: &'static str,
    wind_speed: f64,
    wind_direction: u16,
}

/// Canned weather database.
static WEATHER_DB: [CityWeather; 8] = [
    CityWeather {
        city: "Beijing",
        country: "China",
        temperature: 15.5,
        humidity: 65.0,
        pressure: 1013.2,
        condition: "Cloudy",
        description: "Partly cloudy with light winds",
        wind_speed: 12.5,
        wind_direction: 180,
    },
    CityWeather {
        city: "Shanghai",
        country: "China",
        temperature: 22.3,
        humidity: 78.0,
        pressure: 1015.8,
        condition: "Rainy",
        description: "Light rain with moderate humidity",
        wind_speed: 8.2,
        wind_direction: 90,
    },
    CityWeather {
        city: "Guangzhou",
        country: "China",
        temperature: 28.7,
        humidity: 82.0,
        pressure: 1012.5,
        condition: "Sunny",
        description: "Clear skies with high temperature",
        wind_speed: 6.8,
        wind_direction: 45,
    },
    CityWeather {
        city: "Shenzhen",
        country: "China",
        temperature: 26.9,
        humidity: 75.0,
        pressure: 1014.1,
        condition: "Partly Cloudy",
        description: "Scattered clouds with warm weather",
        wind_speed: 9.3,
        wind_direction: 135,
    },
    CityWeather {
        city: "New York",
        country: "USA",
        temperature: 18.2,
        humidity: 60.0,
        pressure: 1016.3,
        condition: "Clear",
        description: "Clear skies with pleasant temperature",
        wind_speed: 11.7,
        wind_direction: 270,
    },
    CityWeather {
        city: "London",
        country: "UK",
        temperature: 12.8,
        humidity: 85.0,
        pressure: 1008.9,
        condition: "Foggy",
        description: "Dense fog with cool temperature",
        wind_speed: 5.4,
        wind_direction: 225,
    },
    CityWeather {
        city: "Tokyo",
        country: "Japan",
        temperature: 20.1,
        humidity: 70.0,
        pressure: 1018.7,
        condition: "Overcast",
        description: "Overcast skies with mild temperature",
        wind_speed: 7.9,
        wind_direction: 315,
    },
    CityWeather {
        city: "Paris",
        country: "France",
        temperature: 16.4,
        humidity: 68.0,
        pressure: 1011.6,
        condition: "Drizzle",
        description: "Light drizzle with cool breeze",
        wind_speed: 10.2,
        wind_direction: 200,
    },
];

/// Forecast conditions cycled per day.
const FORECAST_CONDITIONS: [&str; 5] = ["Sunny", "Cloudy", "Partly Cloudy", "Rainy", "Overcast"];

/// Builds a complete weather server with the given outbound sink.
///
/// # Errors
///
/// Returns an error if a tool schema cannot be declared.
pub fn server(sink: MessageSink) -> Result<McpServer, SchemaError> {
    let mut server = McpServer::new(ServerInfo::new("Weather Server", "1.0.0"), sink);
    register(&mut server)?;
    Ok(server)
}

/// Registers the weather tools on an existing server.
///
/// # Errors
///
/// Returns an error if a tool schema cannot be declared.
pub fn register(server: &mut McpServer) -> Result<(), SchemaError> {
    let mut current_props = PropertyList::new();
    current_props.push(Property::string("city", None::<&str>)?)?;
    server.add_simple_tool(
        "get_current_weather",
        "Get current weather for a city",
        current_props,
        current_weather,
    );

    let mut forecast_props = PropertyList::new();
    forecast_props.push(Property::string("city", None::<&str>)?)?;
    forecast_props.push(Property::integer_in_range("days", Some(5), 1, 30)?)?;
    server.add_simple_tool(
        "get_weather_forecast",
        "Get weather forecast for a city",
        forecast_props,
        forecast,
    );

    server.add_simple_tool(
        "get_weather_stats",
        "Get global weather statistics",
        PropertyList::new(),
        stats,
    );

    server.add_simple_tool(
        "list_cities",
        "List all supported cities",
        PropertyList::new(),
        list_cities,
    );

    let mut compare_props = PropertyList::new();
    compare_props.push(Property::string("city1", None::<&str>)?)?;
    compare_props.push(Property::string("city2", None::<&str>)?)?;
    server.add_simple_tool(
        "compare_weather",
        "Compare weather between two cities",
        compare_props,
        compare,
    );

    Ok(())
}

/// Case-insensitive city lookup.
fn find(city: &str) -> Option<&'static CityWeather> {
    WEATHER_DB.iter().find(|w| w.city.eq_ignore_ascii_case(city))
}

fn error(text: impl Into<String>) -> ReturnValue {
    ReturnValue::Text(text.into())
}

fn current_weather(props: &PropertyList) -> ReturnValue {
    let Some(city) = props.string_value("city") else {
        return error("Error: City must be a string");
    };
    let Some(weather) = find(city) else {
        return error(format!("Error: Weather data not available for city '{city}'"));
    };

    ReturnValue::Text(format!(
        "Current Weather for {}, {}:\n\
         \x20 Temperature: {:.1}°C\n\
         \x20 Condition: {}\n\
         \x20 Description: {}\n\
         \x20 Humidity: {:.1}%\n\
         \x20 Pressure: {:.1} hPa\n\
         \x20 Wind: {:.1} m/s from {}°",
        weather.city,
        weather.country,
        weather.temperature,
        weather.condition,
        weather.description,
        weather.humidity,
        weather.pressure,
        weather.wind_speed,
        weather.wind_direction,
    ))
}

#[allow(clippy::cast_precision_loss)] // day index is at most 30
fn forecast(props: &PropertyList) -> ReturnValue {
    let Some(city) = props.string_value("city") else {
        return error("Error: City must be a string");
    };
    let Some(weather) = find(city) else {
        return error(format!("Error: Weather data not available for city '{city}'"));
    };

    // The schema bounds days to [1, 30] and defaults it to 5
    let days = props.int_value("days").unwrap_or(5);

    let mut text = format!(
        "{days}-Day Weather Forecast for {}, {}:\n\n",
        weather.city, weather.country
    );

    for day in 0..days {
        // Deterministic per-day variation around the current values
        let temperature = weather.temperature + (day % 5) as f64 - 2.0;
        let humidity = (weather.humidity + (day % 7) as f64 * 2.0 - 6.0).clamp(0.0, 100.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let condition = FORECAST_CONDITIONS[(day % 5) as usize];

        text.push_str(&format!(
            "Day {}:\n\
             \x20 Temperature: {temperature:.1}°C\n\
             \x20 Condition: {condition}\n\
             \x20 Humidity: {humidity:.1}%\n\n",
            day + 1,
        ));
    }

    ReturnValue::Text(text)
}

#[allow(clippy::cast_precision_loss)] // eight cities
fn stats(_props: &PropertyList) -> ReturnValue {
    let count = WEATHER_DB.len() as f64;

    let mut hottest = &WEATHER_DB[0];
    let mut coldest = &WEATHER_DB[0];
    let mut most_humid = &WEATHER_DB[0];
    let mut least_humid = &WEATHER_DB[0];
    let (mut total_temp, mut total_humidity, mut total_pressure) = (0.0, 0.0, 0.0);
    let (mut min_pressure, mut max_pressure) = (f64::MAX, f64::MIN);

    for weather in &WEATHER_DB {
        total_temp += weather.temperature;
        total_humidity += weather.humidity;
        total_pressure += weather.pressure;

        if weather.temperature > hottest.temperature {
            hottest = weather;
        }
        if weather.temperature < coldest.temperature {
            coldest = weather;
        }
        if weather.humidity > most_humid.humidity {
            most_humid = weather;
        }
        if weather.humidity < least_humid.humidity {
            least_humid = weather;
        }
        max_pressure = max_pressure.max(weather.pressure);
        min_pressure = min_pressure.min(weather.pressure);
    }

    ReturnValue::Text(format!(
        "Global Weather Statistics ({} cities):\n\n\
         Temperature:\n\
         \x20 Average: {:.1}°C\n\
         \x20 Highest: {:.1}°C ({})\n\
         \x20 Lowest: {:.1}°C ({})\n\n\
         Humidity:\n\
         \x20 Average: {:.1}%\n\
         \x20 Highest: {:.1}% ({})\n\
         \x20 Lowest: {:.1}% ({})\n\n\
         Pressure:\n\
         \x20 Average: {:.1} hPa\n\
         \x20 Highest: {:.1} hPa\n\
         \x20 Lowest: {:.1} hPa",
        WEATHER_DB.len(),
        total_temp / count,
        hottest.temperature,
        hottest.city,
        coldest.temperature,
        coldest.city,
        total_humidity / count,
        most_humid.humidity,
        most_humid.city,
        least_humid.humidity,
        least_humid.city,
        total_pressure / count,
        max_pressure,
        min_pressure,
    ))
}

fn list_cities(_props: &PropertyList) -> ReturnValue {
    let mut text = String::from("Supported Cities:\n\n");
    for (index, weather) in WEATHER_DB.iter().enumerate() {
        text.push_str(&format!(
            "  {}. {}, {}\n",
            index + 1,
            weather.city,
            weather.country
        ));
    }
    text.push_str("\nUse any of these city names with other weather tools.");
    ReturnValue::Text(text)
}

fn compare(props: &PropertyList) -> ReturnValue {
    let (Some(city1), Some(city2)) = (props.string_value("city1"), props.string_value("city2"))
    else {
        return error("Error: Both cities must be strings");
    };
    let Some(first) = find(city1) else {
        return error(format!("Error: Weather data not available for city '{city1}'"));
    };
    let Some(second) = find(city2) else {
        return error(format!("Error: Weather data not available for city '{city2}'"));
    };

    let warmer = if first.temperature > second.temperature {
        first
    } else {
        second
    };
    let more_humid = if first.humidity > second.humidity {
        first
    } else {
        second
    };
    let higher_pressure = if first.pressure > second.pressure {
        first
    } else {
        second
    };

    ReturnValue::Text(format!(
        "Weather Comparison:\n\n\
         {}, {}:\n\
         \x20 Temperature: {:.1}°C\n\
         \x20 Condition: {}\n\
         \x20 Humidity: {:.1}%\n\
         \x20 Pressure: {:.1} hPa\n\
         \x20 Wind: {:.1} m/s\n\n\
         {}, {}:\n\
         \x20 Temperature: {:.1}°C\n\
         \x20 Condition: {}\n\
         \x20 Humidity: {:.1}%\n\
         \x20 Pressure: {:.1} hPa\n\
         \x20 Wind: {:.1} m/s\n\n\
         Differences:\n\
         \x20 Temperature: {:.1}°C ({} is {})\n\
         \x20 Humidity: {:.1}% ({} is {})\n\
         \x20 Pressure: {:.1} hPa ({} has {})",
        first.city,
        first.country,
        first.temperature,
        first.condition,
        first.humidity,
        first.pressure,
        first.wind_speed,
        second.city,
        second.country,
        second.temperature,
        second.condition,
        second.humidity,
        second.pressure,
        second.wind_speed,
        (first.temperature - second.temperature).abs(),
        warmer.city,
        if first.temperature > second.temperature {
            "warmer"
        } else {
            "cooler"
        },
        (first.humidity - second.humidity).abs(),
        more_humid.city,
        if first.humidity > second.humidity {
            "more humid"
        } else {
            "less humid"
        },
        (first.pressure - second.pressure).abs(),
        higher_pressure.city,
        "higher pressure",
    ))
}
