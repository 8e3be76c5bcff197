//! The discrete selections a trip can be planned from.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Returned when a text does not name any option of a choice.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnknownChoice {
    /// The choice being parsed, e.g. `interest`.
    pub choice: &'static str,
    /// The rejected text.
    pub value: String,
}

impl Display for UnknownChoice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.choice, self.value)
    }
}

impl std::error::Error for UnknownChoice {}

macro_rules! define_choice {
    {
        $(#[$attrs:meta])*
        $name:ident ($label:literal) {
            $(
                $(#[$variant_attrs:meta])*
                $variant:ident => $text:literal,
            )+
        }
    } => {
        $(#[$attrs])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$variant_attrs])*
                $variant,
            )+
        }

        impl $name {
            /// All options, in display order.
            pub const ALL: &[$name] = &[$($name::$variant),+];

            /// Returns the text shown to the user and sent to the model.
            #[inline]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| UnknownChoice {
                        choice: $label,
                        value: s.to_owned(),
                    })
            }
        }
    };
}

define_choice! {
    /// What the traveller is mostly after.
    Interest("interest") {
        /// Treks, rafting, paragliding.
        Adventure => "Adventure",
        /// Durbar squares, temples, festivals.
        Culture => "Culture",
        /// National parks, lakes, wildlife.
        Nature => "Nature",
        /// Monasteries, pilgrimages, meditation.
        Spirituality => "Spirituality",
        /// Easy-going trips for all ages.
        Family => "Family",
    }
}

define_choice! {
    /// How long the trip lasts.
    TripDuration("duration") {
        /// Three days.
        ThreeDays => "3 days",
        /// Five days.
        FiveDays => "5 days",
        /// A week.
        SevenDays => "7 days",
        /// Ten days or more.
        TenPlusDays => "10+ days",
    }
}

define_choice! {
    /// How demanding the activities may be.
    Difficulty("difficulty") {
        /// Suitable for anyone.
        Easy => "Easy",
        /// Requires reasonable fitness.
        Moderate => "Moderate",
        /// High altitude, long days.
        Challenging => "Challenging",
    }
}

define_choice! {
    /// How much the traveller wants to spend.
    Budget("budget") {
        /// Hostels, local buses, dal bhat.
        Budget => "Budget",
        /// Comfortable hotels and private transfers.
        MidRange => "Mid-range",
        /// Boutique lodges and domestic flights.
        Luxury => "Luxury",
    }
}

/// The four independent selections of the planner. Interest and duration
/// are required to plan, difficulty and budget default to "Any".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TripPreferences {
    /// The selected interest.
    pub interest: Option<Interest>,
    /// The selected duration.
    pub duration: Option<TripDuration>,
    /// The selected difficulty.
    pub difficulty: Option<Difficulty>,
    /// The selected budget.
    pub budget: Option<Budget>,
}

impl TripPreferences {
    /// Selects `interest`, or clears it if it is already selected.
    #[inline]
    pub fn toggle_interest(&mut self, interest: Interest) {
        toggle(&mut self.interest, interest);
    }

    /// Selects `duration`, or clears it if it is already selected.
    #[inline]
    pub fn toggle_duration(&mut self, duration: TripDuration) {
        toggle(&mut self.duration, duration);
    }

    /// Selects `difficulty`, or clears it if it is already selected.
    #[inline]
    pub fn toggle_difficulty(&mut self, difficulty: Difficulty) {
        toggle(&mut self.difficulty, difficulty);
    }

    /// Selects `budget`, or clears it if it is already selected.
    #[inline]
    pub fn toggle_budget(&mut self, budget: Budget) {
        toggle(&mut self.budget, budget);
    }

    /// Returns `true` if the required selections are made.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.interest.is_some() && self.duration.is_some()
    }
}

#[inline]
fn toggle<T: PartialEq>(slot: &mut Option<T>, value: T) {
    if slot.as_ref() == Some(&value) {
        *slot = None;
    } else {
        *slot = Some(value);
    }
}

/// A one-shot adjustment of the latest itinerary.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Refinement {
    /// Lower the cost.
    Cheaper,
    /// Add thrill.
    MoreAdventurous,
    /// Slow down, more culture.
    MoreRelaxed,
    /// Any other adjustment, phrased to follow "can you make it".
    Custom(String),
}

impl Refinement {
    /// Returns the phrase inserted into the refinement prompt.
    #[inline]
    pub fn descriptor(&self) -> &str {
        match self {
            Refinement::Cheaper => "more cheaper and budget-friendly",
            Refinement::MoreAdventurous => "more adventurous and thrilling",
            Refinement::MoreRelaxed => "more relaxed and cultural",
            Refinement::Custom(descriptor) => descriptor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("adventure".parse::<Interest>(), Ok(Interest::Adventure));
        assert_eq!(" 5 DAYS ".parse::<TripDuration>(), Ok(TripDuration::FiveDays));
        assert_eq!("10+ days".parse::<TripDuration>(), Ok(TripDuration::TenPlusDays));
        assert_eq!("mid-range".parse::<Budget>(), Ok(Budget::MidRange));
        assert_eq!(
            "Extreme".parse::<Difficulty>(),
            Err(UnknownChoice {
                choice: "difficulty",
                value: "Extreme".to_owned(),
            })
        );
    }

    #[test]
    fn test_toggle() {
        let mut prefs = TripPreferences::default();
        prefs.toggle_interest(Interest::Culture);
        prefs.toggle_duration(TripDuration::SevenDays);
        assert!(prefs.is_complete());

        prefs.toggle_interest(Interest::Nature);
        assert_eq!(prefs.interest, Some(Interest::Nature));
        prefs.toggle_interest(Interest::Nature);
        assert_eq!(prefs.interest, None);
        assert!(!prefs.is_complete());

        prefs.toggle_budget(Budget::Luxury);
        prefs.toggle_difficulty(Difficulty::Easy);
        assert_eq!(prefs.budget, Some(Budget::Luxury));
        assert_eq!(prefs.difficulty, Some(Difficulty::Easy));
    }

    #[test]
    fn test_all_options_in_order() {
        let names: Vec<_> = Interest::ALL.iter().map(|i| i.as_str()).collect();
        assert_eq!(
            names,
            ["Adventure", "Culture", "Nature", "Spirituality", "Family"]
        );
        assert_eq!(TripDuration::ALL.len(), 4);
    }
}
