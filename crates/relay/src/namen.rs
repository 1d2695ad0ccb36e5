//! Anzeigenamen-Generator
//!
//! Vergibt beim Verbindungsaufbau zufaellige, menschenlesbare Namen
//! (Adjektiv + Tier). Eindeutigkeit ist nicht garantiert und nicht
//! noetig – die Identitaet ist die PeerId, der Name nur Anzeige.

use rand::seq::SliceRandom;

const ADJEKTIVE: &[&str] = &[
    "Mutiger", "Stiller", "Flinker", "Neugieriger", "Gelassener", "Wacher",
    "Froehlicher", "Bedaechtiger", "Eifriger", "Verwegener", "Sanfter",
    "Findiger", "Geduldiger", "Munterer", "Schlauer", "Tapferer",
];

const TIERE: &[&str] = &[
    "Dachs", "Fuchs", "Luchs", "Biber", "Igel", "Marder", "Otter",
    "Falke", "Kauz", "Reiher", "Hirsch", "Wiesel", "Siebenschlaefer",
    "Steinbock", "Feldhase", "Kranich",
];

/// Erzeugt einen zufaelligen Anzeigenamen
pub fn zufaelliger_name() -> String {
    let mut rng = rand::thread_rng();
    // Die Listen sind nicht leer, choose gibt daher immer Some zurueck
    let adjektiv = ADJEKTIVE.choose(&mut rng).copied().unwrap_or("Namenloser");
    let tier = TIERE.choose(&mut rng).copied().unwrap_or("Gast");
    format!("{} {}", adjektiv, tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_hat_zwei_teile() {
        let name = zufaelliger_name();
        let teile: Vec<&str> = name.split(' ').collect();
        assert_eq!(teile.len(), 2);
        assert!(ADJEKTIVE.contains(&teile[0]));
        assert!(TIERE.contains(&teile[1]));
    }

    #[test]
    fn namen_variieren() {
        // Bei 256 Kombinationen ist Gleichheit ueber 50 Ziehungen
        // praktisch ausgeschlossen.
        let erster = zufaelliger_name();
        let irgendein_anderer = (0..50).map(|_| zufaelliger_name()).any(|n| n != erster);
        assert!(irgendein_anderer);
    }
}
