//! Card data and the built-in card registry

use serde::{Deserialize, Serialize};

/// Identifier of a card in the registry
///
/// Card ids are stable across battles and across replays; the battle log
/// stores decks as plain lists of these ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl CardId {
    pub const fn new(id: u32) -> Self {
        CardId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Card families
///
/// Every card belongs to a family; a few families carry a combat quirk
/// (Insects poison on hit, Titans are too big for a crowded board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardFamily {
    Insects,
    Rodents,
    Reptiles,
    Titans,
}

impl std::fmt::Display for CardFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardFamily::Insects => "Insects",
            CardFamily::Rodents => "Rodents",
            CardFamily::Reptiles => "Reptiles",
            CardFamily::Titans => "Titans",
        };
        write!(f, "{}", name)
    }
}

/// Spell effects
///
/// A closed enumeration: every spell in the card set maps to exactly one
/// of these, and the effect action dispatches over it with an exhaustive
/// match. No stringly-typed effect components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardEffect {
    /// Caster draws this many cards (resolved as chained draw actions).
    GainDraws(u32),

    /// Adds a damage stat override to every held card of the family in
    /// the caster's hand.
    BuffHeldFamilyDamage { family: CardFamily, amount: i32 },

    /// Trap: the next non-spell card the opponent plays is destroyed.
    KillNextEnemyCard,

    /// The opponent's board cards lose this much damage until their
    /// end-of-turn cleanup.
    EnemyBoardDebuff { amount: i32 },

    /// The opponent's non-spell cards cost this much more weight until
    /// their end-of-turn cleanup.
    EnemyWeightSurcharge { amount: i32 },

    /// Marks the opponent's newest board card for destruction.
    DestroyNewestEnemyCard,
}

/// Static data for one card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardData {
    pub id: CardId,
    pub name: &'static str,
    pub family: CardFamily,

    /// Damage dealt when this card attacks from the board
    pub damage: i32,

    /// Weight ammo cost to play this card
    pub weight: i32,

    /// Present on spell cards only
    pub effect: Option<CardEffect>,
}

impl CardData {
    pub fn is_spell(&self) -> bool {
        self.effect.is_some()
    }
}

/// Read-only card lookup, built once at startup
///
/// The registry is the only source of card data: actions, the rule
/// engine and the greedy policy all resolve `CardId`s through it and
/// never mutate it.
#[derive(Debug, Clone)]
pub struct CardRegistry {
    cards: Vec<CardData>,
}

impl CardRegistry {
    /// The standard battle card set
    pub fn standard() -> Self {
        use CardEffect::*;
        use CardFamily::*;

        let mut cards = Vec::new();
        let mut add = |name, family, damage, weight, effect| {
            let id = CardId::new(cards.len() as u32);
            cards.push(CardData {
                id,
                name,
                family,
                damage,
                weight,
                effect,
            });
        };

        // Creatures
        add("Firefly", Insects, 1, 1, None);
        add("Hornet", Insects, 2, 1, None);
        add("Mantis", Insects, 3, 2, None);
        add("Weaver", Insects, 2, 3, None);
        add("Vole", Rodents, 2, 1, None);
        add("Beaver", Rodents, 3, 3, None);
        add("Marmot", Rodents, 4, 4, None);
        add("Gecko", Reptiles, 2, 2, None);
        add("Iguana", Reptiles, 4, 3, None);
        add("Basilisk", Reptiles, 6, 5, None);
        add("Mammoth", Titans, 8, 6, None);
        add("Leviathan", Titans, 10, 8, None);

        // Spells
        add("Swarm Call", Insects, 0, 1, Some(GainDraws(2)));
        add(
            "Venom Brew",
            Insects,
            0,
            2,
            Some(BuffHeldFamilyDamage {
                family: Insects,
                amount: 2,
            }),
        );
        add("Steel Jaws", Rodents, 0, 2, Some(KillNextEnemyCard));
        add("Bramble Net", Reptiles, 0, 3, Some(EnemyBoardDebuff { amount: 2 }));
        add("Tar Pit", Titans, 0, 2, Some(EnemyWeightSurcharge { amount: 1 }));
        add("Rockslide", Titans, 0, 4, Some(DestroyNewestEnemyCard));

        CardRegistry { cards }
    }

    /// Look up a card by id
    ///
    /// Panics on an unknown id: ids only come from the registry itself
    /// (via decks and draws), so a miss is an internal defect.
    pub fn get(&self, id: CardId) -> &CardData {
        self.cards
            .get(id.0 as usize)
            .unwrap_or_else(|| panic!("Unknown card id {}", id))
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn all_card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|c| c.id).collect()
    }

    /// All card ids of one family (creatures and spells) - the deck pool
    /// used by the stock family decks.
    pub fn family_deck(&self, family: CardFamily) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|c| c.family == family)
            .map(|c| c.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_ids_are_dense() {
        let registry = CardRegistry::standard();
        for (idx, id) in registry.all_card_ids().iter().enumerate() {
            assert_eq!(id.as_u32() as usize, idx);
            assert_eq!(registry.get(*id).id, *id);
        }
    }

    #[test]
    fn test_spells_have_zero_damage() {
        let registry = CardRegistry::standard();
        for id in registry.all_card_ids() {
            let card = registry.get(id);
            if card.is_spell() {
                assert_eq!(card.damage, 0, "{} is a spell with damage", card.name);
            }
        }
    }

    #[test]
    fn test_family_decks_are_nonempty() {
        let registry = CardRegistry::standard();
        for family in [
            CardFamily::Insects,
            CardFamily::Rodents,
            CardFamily::Reptiles,
            CardFamily::Titans,
        ] {
            let deck = registry.family_deck(family);
            assert!(!deck.is_empty());
            assert!(deck.iter().all(|id| registry.get(*id).family == family));
        }
    }

    #[test]
    #[should_panic(expected = "Unknown card id")]
    fn test_unknown_id_panics() {
        let registry = CardRegistry::standard();
        registry.get(CardId::new(9999));
    }
}
