use log::info;
use netatmo_export::{
    Area, ExportConfig, MeasurementType, NetatmoExport, NetatmoExportError, TimeRange,
};

// Edit these to choose the area, time range and data set name.
const AREA: Area = Area {
    north: 55.0,
    west: -130.0,
    south: 15.0,
    east: -60.0,
};
const START: &str = "2022-01-15T00:00:00Z";
const END: &str = "2022-01-17T00:00:00Z";
const MEASUREMENT: MeasurementType = MeasurementType::Pressure;
const NAME: &str = "netatmo-2022-01-15-17";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), NetatmoExportError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ExportConfig::builder()
        .area(AREA)
        .range(TimeRange::parse(START, END)?)
        .measurement(MEASUREMENT)
        .name(NAME)
        .build();

    let summary = NetatmoExport::new(config)?.run().await?;
    info!(
        "Exported {} readings from {} stations to {} and {}",
        summary.readings,
        summary.stations,
        summary.json_path.display(),
        summary.csv_path.display()
    );
    Ok(())
}
