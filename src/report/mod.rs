pub mod json;
pub mod text;

use crate::config::Config;
use crate::error::Result;
use crate::verify::Report;

pub fn print(report: &Report, config: &Config) -> Result<()> {
    if config.json_output {
        let rendered = json::render(report).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", text::render(report));
    }
    Ok(())
}
