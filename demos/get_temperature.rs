use std::env;
use weather_lookup::{ServiceConfig, ServiceError, WeatherService};

fn main() -> Result<(), ServiceError> {
    let mut args = env::args().skip(1);
    let province = args.next().unwrap_or_else(|| "江苏".to_string());
    let city = args.next().unwrap_or_else(|| "苏州".to_string());
    let county = args.next().unwrap_or_else(|| "昆山".to_string());

    let service = WeatherService::builder()
        .config(ServiceConfig::default())
        .build()?;

    match service.temperature(&province, &city, &county) {
        Ok(temperature) => println!("{province} {city} {county}: {temperature}°C"),
        Err(e) => println!("No temperature for {province} {city} {county}: {e}"),
    }

    let temperature = service.get_temperature(&province, &city, &county).unwrap_or(0);
    println!("{temperature}");

    Ok(())
}
