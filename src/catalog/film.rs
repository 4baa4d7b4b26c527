use crate::catalog::{
    filter::{FilterChain, FilterOp},
    traits::{impl_from_str, CatalogEntry},
};

/// Simulated film stock
///
/// Each stock carries a fixed color transform modelling the look of the
/// emulsion it is named after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilmStock {
    #[default]
    Standard,
    Portra400,
    IlfordHp5,
    Cinestill800T,
    Ektar100,
}

impl FilmStock {
    /// Short description shown next to the stock name
    pub fn description(&self) -> &'static str {
        match self {
            FilmStock::Standard => "Original",
            FilmStock::Portra400 => "Warm tones, fine grain",
            FilmStock::IlfordHp5 => "High contrast B&W",
            FilmStock::Cinestill800T => "Cool shadows, glowing highlights",
            FilmStock::Ektar100 => "Vivid, punchy colors",
        }
    }

    /// The stock's color transform
    pub fn effect(&self) -> FilterChain {
        use FilterOp::*;

        match self {
            FilmStock::Standard => FilterChain::new([Contrast(1.0), Brightness(1.0)]),
            FilmStock::Portra400 => FilterChain::new([
                Sepia(0.3),
                Saturate(1.4),
                Contrast(0.9),
                Brightness(1.1),
                HueRotate(-10.0),
            ]),
            FilmStock::IlfordHp5 => {
                FilterChain::new([Grayscale(1.0), Contrast(1.2), Brightness(0.9)])
            }
            FilmStock::Cinestill800T => FilterChain::new([
                Sepia(0.1),
                HueRotate(180.0),
                Saturate(1.1),
                Brightness(1.05),
                Contrast(1.1),
            ]),
            FilmStock::Ektar100 => {
                FilterChain::new([Saturate(1.5), Contrast(1.1), Brightness(0.95)])
            }
        }
    }

    /// Whether the stock renders monochrome
    pub fn is_monochrome(&self) -> bool {
        self.effect()
            .ops()
            .iter()
            .any(|op| matches!(op, FilterOp::Grayscale(a) if *a >= 1.0))
    }
}

impl CatalogEntry for FilmStock {
    const KIND: &'static str = "film stock";

    fn all() -> &'static [Self] {
        &[
            FilmStock::Standard,
            FilmStock::Portra400,
            FilmStock::IlfordHp5,
            FilmStock::Cinestill800T,
            FilmStock::Ektar100,
        ]
    }

    fn id(&self) -> &'static str {
        match self {
            FilmStock::Standard => "standard",
            FilmStock::Portra400 => "portra400",
            FilmStock::IlfordHp5 => "ilford-bw",
            FilmStock::Cinestill800T => "cinestill",
            FilmStock::Ektar100 => "ektar",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FilmStock::Standard => "Standard",
            FilmStock::Portra400 => "Portra 400",
            FilmStock::IlfordHp5 => "Ilford HP5",
            FilmStock::Cinestill800T => "Cinestill 800T",
            FilmStock::Ektar100 => "Ektar 100",
        }
    }
}

impl_from_str!(FilmStock);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_default() {
        assert_eq!(FilmStock::at(0), Some(FilmStock::default()));
        assert_eq!(FilmStock::all().len(), 5);
        assert_eq!(FilmStock::IlfordHp5.index(), 2);
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(FilmStock::from_id("ilford-bw").unwrap(), FilmStock::IlfordHp5);
        assert_eq!("cinestill".parse::<FilmStock>().unwrap(), FilmStock::Cinestill800T);
        assert!(FilmStock::from_id("velvia").is_err());
    }

    #[test]
    fn test_effect_descriptors() {
        assert!(FilmStock::Standard.effect().is_identity());
        assert_eq!(
            FilmStock::IlfordHp5.effect().to_string(),
            "grayscale(1) contrast(1.2) brightness(0.9)"
        );
        assert!(FilmStock::IlfordHp5.is_monochrome());
        assert!(!FilmStock::Portra400.is_monochrome());
    }
}
