//! Small in-memory tables shared by unit tests.

use super::{loader, AssetResolver, Dataset};
use crate::config::DashboardConfig;
use crate::filter::YearRange;

/// Data rows in [`ACCIDENTS_CSV`], including the two that get dropped.
pub const ACCIDENT_ROWS: usize = 18;

pub const ACCIDENTS_CSV: &str = "\
date,type,operator,location,Latitude,Longitude,total fatality
2009-06-01,A330,Air France,Atlantic Ocean,3.07,-30.56,228
2001-11-12,A300,American Airlines,\"Queens, New York\",40.58,-73.85,265
2005-08-14,B737,Helios Airways,\"Grammatiko, Greece\",38.23,23.97,121
2008-08-20,MD-82,Spanair,\"Madrid, Spain\",40.47,-3.56,154
2009-02-12,DHC-8,Colgan Air,\"Clarence Center, New York\",43.00,-78.64,50
2004-01-03,B737,Flash Airlines,\"Sharm el-Sheikh, Egypt\",27.9,34.4,148
2006-08-27,CRJ-100,Comair,\"Lexington, Kentucky\",38.04,-84.6,49
1985-08-12,B747,Japan Air Lines,\"Mount Takamagahara, Japan\",36.0,138.7,520
1977-03-27,B747,KLM,\"Tenerife, Spain\",28.48,-16.34,583
2014-03-08,B777,Malaysia Airlines,Indian Ocean,,,239
2015-03-24,A320,Germanwings,\"Prads-Haute-Bl\u{e9}one, France\",44.28,6.44,150
2018-10-29,B737 MAX,Lion Air,Java Sea,-5.81,107.12,189
2019-03-10,B737 MAX,Ethiopian Airlines,\"Bishoftu, Ethiopia\",8.87,39.25,157
2003-05-02,C-172,Private,Unknown field,,,
not a date,A320,Bogus Air,Nowhere,0,0,10
1955-06-01,DC-3,Old Air,Somewhere,10,10,20
2020-01-08,B737,Ukraine International,\"Tehran, Iran\",35.56,51.1,176
2023-01-15,ATR 72,Yeti Airlines,\"Pokhara, Nepal\",28.2,83.98,72
";

pub const IMPACTS_CSV: &str = "\
date,type,operator,onboard fatality,ground fatality,total fatality,impact
2009-06-01,A330,Air France,228,0,228,Pitot tube replacement|Stall recovery training
2001-11-12,A300,American Airlines,260,5,265,Rudder pedal design|Wake turbulence training
1977-03-27,B747,KLM,583,0,583,Standard phraseology|Crew resource management
2009-02-12,DHC-8,Colgan Air,49,1,50,Stall recovery training|Pilot rest rules
2019-03-10,B737 MAX,Ethiopian Airlines,157,0,157,MCAS redesign|Pilot simulator training
2018-10-29,B737 MAX,Lion Air,189,0,189,MCAS redesign
2009-02-12,DHC-8,Colgan Air,49,1,50,Pilot rest rules
bad-date,X,Y,1,0,1,Something
1996-07-17,B747,TWA,230,0,230,
";

pub const CLEANED_CSV: &str = "\
acc. date,type,Total Fatality,capacity
1977-03-27,B747,583,550
1985-08-12,B747,520,528
1996-07-17,B747,230,
2001-11-12,A300,265,266
2009-06-01,A330,228,303
2014-03-08,B777,239,
2014-07-17,B777,298,298
2015-03-24,A320,150,174
2018-10-29,B737,189,189
2019-03-10,B737,157,189
2020-01-08,B737,176,189
2023-01-15,ATR 72,72,72
garbage,B737,10,100
1959-12-31,DC-3,20,30
";

/// The fixture tables loaded over the full window.
pub fn dataset() -> Dataset {
    let window = YearRange::full();
    let (accidents, _) = loader::load_accidents(ACCIDENTS_CSV.as_bytes(), window).unwrap();
    let (impacts, _) = loader::load_impacts(IMPACTS_CSV.as_bytes(), window).unwrap();
    let (cleaned, _) = loader::load_cleaned(CLEANED_CSV.as_bytes(), window).unwrap();
    Dataset::from_records(
        accidents,
        impacts,
        cleaned,
        AssetResolver::new("/nonexistent/assets"),
        DashboardConfig::default(),
    )
}

/// A dataset with no rows at all.
pub fn empty_dataset() -> Dataset {
    Dataset::from_records(
        Vec::new(),
        Vec::new(),
        Vec::new(),
        AssetResolver::new("/nonexistent/assets"),
        DashboardConfig::default(),
    )
}
