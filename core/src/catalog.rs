//! Provider seed catalog.
//!
//! A fixed list of providers seeded idempotently at startup (and re-checked
//! cheaply on catalog reads). Identity for the insert-if-absent key is the
//! display name; the catalog is a fixed list with unique names.

use crate::error::StoreError;
use crate::store::ProviderStore;
use crate::types::{Provider, ProviderId};

/// Outcome of one seed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Providers newly inserted
    pub inserted: u64,
    /// Providers skipped because one with the same name existed
    pub skipped_existing: u64,
    /// Individual insert failures (logged, batch continued)
    pub failed: u64,
    /// The count check skipped the seed entirely
    pub short_circuited: bool,
}

struct SeedEntry {
    name: &'static str,
    title: &'static str,
    category: &'static str,
    specialties: &'static [&'static str],
    experience_years: i32,
    rating: f64,
    review_count: i32,
    fee: i32,
    languages: &'static [&'static str],
    bio: &'static str,
    education: &'static str,
    current_work: &'static str,
    image: &'static str,
    verified: bool,
}

const SEED_ENTRIES: [SeedEntry; 6] = [
    SeedEntry {
        name: "Dr. Maya Krishnan",
        title: "Clinical Psychologist",
        category: "mental-health",
        specialties: &["anxiety", "depression", "cbt"],
        experience_years: 12,
        rating: 4.8,
        review_count: 214,
        fee: 1200,
        languages: &["English", "Tamil"],
        bio: "Works with adults navigating anxiety, low mood and burnout.",
        education: "M.Phil Clinical Psychology, NIMHANS",
        current_work: "Senior Psychologist, Mindful Care Clinic",
        image: "providers/maya-krishnan.jpg",
        verified: true,
    },
    SeedEntry {
        name: "Dr. Arjun Mehta",
        title: "Psychiatrist",
        category: "mental-health",
        specialties: &["mood-disorders", "sleep", "medication-management"],
        experience_years: 15,
        rating: 4.7,
        review_count: 187,
        fee: 1800,
        languages: &["English", "Hindi"],
        bio: "Focus on mood disorders and medication review for young adults.",
        education: "MD Psychiatry, AIIMS Delhi",
        current_work: "Consultant Psychiatrist, Serene Hospital",
        image: "providers/arjun-mehta.jpg",
        verified: true,
    },
    SeedEntry {
        name: "Dr. Sara Thomas",
        title: "Gynecologist",
        category: "womens-health",
        specialties: &["pcos", "menstrual-health", "fertility"],
        experience_years: 10,
        rating: 4.9,
        review_count: 302,
        fee: 1500,
        languages: &["English", "Malayalam"],
        bio: "PCOS and menstrual health specialist with a lifestyle-first approach.",
        education: "MS Obstetrics & Gynecology, CMC Vellore",
        current_work: "Consultant, Bloom Women's Clinic",
        image: "providers/sara-thomas.jpg",
        verified: true,
    },
    SeedEntry {
        name: "Anita Rao",
        title: "Nutritionist",
        category: "lifestyle",
        specialties: &["weight-management", "pcos-diet", "sports-nutrition"],
        experience_years: 8,
        rating: 4.6,
        review_count: 156,
        fee: 800,
        languages: &["English", "Kannada", "Hindi"],
        bio: "Helps clients build sustainable eating habits without fad diets.",
        education: "MSc Food Science & Nutrition",
        current_work: "Independent practice",
        image: "providers/anita-rao.jpg",
        verified: false,
    },
    SeedEntry {
        name: "Rahul Verma",
        title: "Counseling Therapist",
        category: "mental-health",
        specialties: &["relationships", "stress", "grief"],
        experience_years: 7,
        rating: 4.5,
        review_count: 98,
        fee: 900,
        languages: &["English", "Hindi"],
        bio: "Talk therapy for relationship stress, grief and life transitions.",
        education: "MA Counseling Psychology",
        current_work: "Therapist, OpenMind Collective",
        image: "providers/rahul-verma.jpg",
        verified: true,
    },
    SeedEntry {
        name: "Dr. Leela Nair",
        title: "Dermatologist",
        category: "skin-health",
        specialties: &["acne", "hair-loss", "skin-allergies"],
        experience_years: 11,
        rating: 4.7,
        review_count: 243,
        fee: 1300,
        languages: &["English", "Malayalam", "Hindi"],
        bio: "Evidence-based skin and hair care for hormonal and stress-related conditions.",
        education: "MD Dermatology, JIPMER",
        current_work: "Consultant Dermatologist, ClearSkin Clinic",
        image: "providers/leela-nair.jpg",
        verified: true,
    },
];

impl SeedEntry {
    fn to_provider(&self) -> Provider {
        Provider {
            id: ProviderId::new(),
            name: self.name.to_string(),
            title: self.title.to_string(),
            category: self.category.to_string(),
            specialties: self.specialties.iter().map(ToString::to_string).collect(),
            experience_years: self.experience_years,
            rating: self.rating,
            review_count: self.review_count,
            fee: self.fee,
            languages: self.languages.iter().map(ToString::to_string).collect(),
            bio: self.bio.to_string(),
            education: self.education.to_string(),
            current_work: self.current_work.to_string(),
            image: self.image.to_string(),
            verified: self.verified,
        }
    }
}

/// Number of providers in the seed catalog.
#[must_use]
pub const fn seed_catalog_len() -> u64 {
    SEED_ENTRIES.len() as u64
}

/// The seed catalog as fresh provider entities (new ids each call; identity
/// for idempotence is the display name, not the id).
#[must_use]
pub fn seed_catalog() -> Vec<Provider> {
    SEED_ENTRIES.iter().map(SeedEntry::to_provider).collect()
}

/// Idempotently seed the provider catalog.
///
/// A fresh count check short-circuits when the catalog is already present;
/// otherwise each provider is inserted if absent by name, continuing past
/// individual failures.
///
/// # Errors
///
/// Returns [`StoreError`] only when the count itself fails.
pub async fn ensure_providers(providers: &dyn ProviderStore) -> Result<SeedReport, StoreError> {
    let existing = providers.count().await?;
    if existing >= seed_catalog_len() {
        return Ok(SeedReport {
            short_circuited: true,
            ..SeedReport::default()
        });
    }

    let mut report = SeedReport::default();
    for provider in seed_catalog() {
        let name = provider.name.clone();
        match providers.insert_if_absent(provider).await {
            Ok(true) => report.inserted += 1,
            Ok(false) => report.skipped_existing += 1,
            Err(e) => {
                report.failed += 1;
                tracing::warn!(provider = %name, error = %e, "provider seed insert failed, continuing");
            }
        }
    }

    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped_existing,
        failed = report.failed,
        "provider catalog seed complete"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_names_are_unique() {
        let names: HashSet<_> = SEED_ENTRIES.iter().map(|e| e.name).collect();
        assert_eq!(names.len(), SEED_ENTRIES.len());
    }

    #[test]
    fn seed_catalog_matches_declared_len() {
        assert_eq!(seed_catalog().len() as u64, seed_catalog_len());
    }

    #[test]
    fn seed_entries_carry_display_data() {
        for provider in seed_catalog() {
            assert!(!provider.name.is_empty());
            assert!(!provider.title.is_empty());
            assert!(!provider.specialties.is_empty());
            assert!(provider.rating >= 0.0 && provider.rating <= 5.0);
        }
    }
}
