//! Seed binary for reference data.
//!
//! Inserts the California universities used for map markers, and optionally
//! a handful of demo listings placed near campuses so they show up on the
//! map immediately.
//!
//! # Usage
//!
//! ```bash
//! # Universities only
//! cargo run --bin housing-seed
//!
//! # Also seed demo listings owned by user 65
//! cargo run --bin housing-seed -- --listings --owner-id 65
//! ```

use std::env;

use bigdecimal::BigDecimal;
use bigdecimal::FromPrimitive;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use housing_rust::db::RepositoryFactory;
use housing_rust::models::{NewListing, NewUniversity};

const UNIVERSITIES: &[(&str, &str, f64, f64)] = &[
    // UC schools
    ("UCLA", "University of California, Los Angeles", 34.0689, -118.4452),
    ("UC Berkeley", "University of California, Berkeley", 37.8719, -122.2585),
    ("UCSD", "University of California, San Diego", 32.8801, -117.2340),
    ("UC Irvine", "University of California, Irvine", 33.6405, -117.8443),
    ("UC Davis", "University of California, Davis", 38.5382, -121.7617),
    ("UC Santa Barbara", "University of California, Santa Barbara", 34.4140, -119.8489),
    ("UC Santa Cruz", "University of California, Santa Cruz", 36.9914, -122.0609),
    ("UC Riverside", "University of California, Riverside", 33.9737, -117.3281),
    ("UC Merced", "University of California, Merced", 37.3660, -120.4248),
    ("UCSF", "University of California, San Francisco", 37.7631, -122.4586),
    // CSU schools
    ("CSUN", "California State University, Northridge", 34.2381, -118.5285),
    ("CSULB", "California State University, Long Beach", 33.7838, -118.1141),
    ("CSUF", "California State University, Fullerton", 33.8829, -117.8869),
    ("SDSU", "San Diego State University", 32.7757, -117.0719),
    ("SJSU", "San José State University", 37.3352, -121.8811),
    ("SF State", "San Francisco State University", 37.7241, -122.4783),
    ("Cal Poly SLO", "California Polytechnic State University, San Luis Obispo", 35.3050, -120.6625),
    ("Cal Poly Pomona", "California State Polytechnic University, Pomona", 34.0565, -117.8215),
    ("Fresno State", "California State University, Fresno", 36.8134, -119.7483),
    ("Sac State", "California State University, Sacramento", 38.5607, -121.4234),
    ("Cal State LA", "California State University, Los Angeles", 34.0667, -118.1690),
    ("CSU East Bay", "California State University, East Bay", 37.6565, -122.0568),
    ("Chico State", "California State University, Chico", 39.7301, -121.8455),
    ("Sonoma State", "Sonoma State University", 38.3394, -122.6741),
    ("Humboldt", "Cal Poly Humboldt", 40.8760, -124.0786),
    ("CSU Dominguez Hills", "California State University, Dominguez Hills", 33.8636, -118.2553),
    ("CSU San Bernardino", "California State University, San Bernardino", 34.1812, -117.3237),
    ("CSU Bakersfield", "California State University, Bakersfield", 35.3507, -119.1026),
    ("Stanislaus State", "California State University, Stanislaus", 37.5256, -120.8561),
    ("CSU Monterey Bay", "California State University, Monterey Bay", 36.6536, -121.7989),
    ("CSU San Marcos", "California State University, San Marcos", 33.1284, -117.1597),
    ("CSU Channel Islands", "California State University, Channel Islands", 34.1625, -119.0452),
    ("Maritime Academy", "California State University Maritime Academy", 38.0698, -122.2310),
    // Private universities
    ("Stanford", "Stanford University", 37.4275, -122.1697),
    ("USC", "University of Southern California", 34.0224, -118.2851),
    ("Caltech", "California Institute of Technology", 34.1377, -118.1253),
    ("Pepperdine", "Pepperdine University", 34.0360, -118.7095),
    ("LMU", "Loyola Marymount University", 33.9700, -118.4179),
    ("USD", "University of San Diego", 32.7719, -117.1881),
    ("Santa Clara", "Santa Clara University", 37.3496, -121.9390),
    ("USF", "University of San Francisco", 37.7765, -122.4506),
    ("Chapman", "Chapman University", 33.7930, -117.8514),
    ("Pomona College", "Pomona College", 34.0977, -117.7112),
];

struct DemoListing {
    title: &'static str,
    description: &'static str,
    location: &'static str,
    address: &'static str,
    city: &'static str,
    state: &'static str,
    zip_code: &'static str,
    latitude: f64,
    longitude: f64,
    monthly_rent: f64,
    bedrooms: &'static str,
    bathrooms: &'static str,
    square_feet: i32,
    room_type: &'static str,
    amenities: &'static str,
}

const DEMO_LISTINGS: &[DemoListing] = &[
    DemoListing {
        title: "2BR Near CSUN, Modern & Bright",
        description: "Spacious 2 bedroom apartment a short walk from CSUN. Updated kitchen, in-unit laundry.",
        location: "Northridge",
        address: "9301 Reseda Blvd",
        city: "Northridge",
        state: "CA",
        zip_code: "91324",
        latitude: 34.2230,
        longitude: -118.5390,
        monthly_rent: 1950.0,
        bedrooms: "2",
        bathrooms: "1",
        square_feet: 900,
        room_type: "Apartment",
        amenities: "WiFi,Parking,Laundry,AC",
    },
    DemoListing {
        title: "Studio Near UCLA, Perfect for Students",
        description: "Cozy studio apartment 5 minutes from UCLA campus. Bills included.",
        location: "Westwood",
        address: "10920 Wilshire Blvd",
        city: "Los Angeles",
        state: "CA",
        zip_code: "90024",
        latitude: 34.0600,
        longitude: -118.4450,
        monthly_rent: 1600.0,
        bedrooms: "Studio",
        bathrooms: "1",
        square_feet: 420,
        room_type: "Studio",
        amenities: "WiFi,Gym,Pool",
    },
    DemoListing {
        title: "1BR in Koreatown, Close to USC",
        description: "Clean 1 bedroom near USC and Metro. Quiet building, gated parking.",
        location: "Koreatown",
        address: "3470 Wilshire Blvd",
        city: "Los Angeles",
        state: "CA",
        zip_code: "90010",
        latitude: 34.0580,
        longitude: -118.3000,
        monthly_rent: 1750.0,
        bedrooms: "1",
        bathrooms: "1",
        square_feet: 650,
        room_type: "Apartment",
        amenities: "WiFi,Parking,Laundry",
    },
    DemoListing {
        title: "3BR House Near SDSU, Split with Friends",
        description: "Full 3 bedroom house near SDSU. Great for 3 roommates. Backyard, street parking.",
        location: "College Area",
        address: "5402 College Ave",
        city: "San Diego",
        state: "CA",
        zip_code: "92115",
        latitude: 32.7720,
        longitude: -117.0710,
        monthly_rent: 3300.0,
        bedrooms: "3",
        bathrooms: "1.5",
        square_feet: 1250,
        room_type: "House",
        amenities: "WiFi,Parking,Backyard,Laundry",
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder().with_max_level(Level::INFO).init();

    let args: Vec<String> = env::args().collect();
    let seed_listings = args.iter().any(|a| a == "--listings");
    let owner_id = args
        .iter()
        .position(|a| a == "--owner-id")
        .and_then(|i| args.get(i + 1))
        .map(|v| v.parse::<i64>())
        .transpose()
        .map_err(|_| anyhow::anyhow!("--owner-id must be an integer"))?
        .unwrap_or(1);

    let repository = RepositoryFactory::from_env()?;

    let mut created = 0usize;
    let mut skipped = 0usize;
    for (name, full_name, latitude, longitude) in UNIVERSITIES {
        let inserted = repository
            .create_university(NewUniversity {
                name: name.to_string(),
                full_name: full_name.to_string(),
                latitude: *latitude,
                longitude: *longitude,
            })
            .await?;
        match inserted {
            Some(u) => {
                info!(name = %u.name, "created university");
                created += 1;
            }
            None => skipped += 1,
        }
    }
    info!(created, skipped, "university seeding done");

    if seed_listings {
        for demo in DEMO_LISTINGS {
            let rent = BigDecimal::from_f64(demo.monthly_rent)
                .ok_or_else(|| anyhow::anyhow!("invalid demo rent"))?;
            let listing = repository
                .create_listing(NewListing {
                    title: demo.title.to_string(),
                    description: demo.description.to_string(),
                    location: demo.location.to_string(),
                    address: Some(demo.address.to_string()),
                    city: demo.city.to_string(),
                    state: demo.state.to_string(),
                    zip_code: Some(demo.zip_code.to_string()),
                    latitude: Some(demo.latitude),
                    longitude: Some(demo.longitude),
                    monthly_rent: rent,
                    bedrooms: demo.bedrooms.to_string(),
                    bathrooms: demo.bathrooms.to_string(),
                    square_feet: Some(demo.square_feet),
                    room_type: demo.room_type.to_string(),
                    amenities: demo.amenities.to_string(),
                    image_url: String::new(),
                    available_from: None,
                    owner_id,
                })
                .await?;
            info!(id = listing.id, title = %listing.title, "created demo listing");
        }
    }

    Ok(())
}
