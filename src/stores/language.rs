//! UI language and the built-in translation table

use serde::{Deserialize, Serialize};

use crate::core::constants::LANGUAGE_STORAGE_KEY;
use crate::persistence::Persist;
use crate::types::Language;

/// `(section, key, es, en)`
type Entry = (&'static str, &'static str, &'static str, &'static str);

const TRANSLATIONS: &[Entry] = &[
    ("navigation", "main", "Principal", "Main"),
    ("navigation", "dashboard", "Panel", "Dashboard"),
    ("navigation", "proposals", "Propuestas", "Proposals"),
    ("navigation", "activeProposals", "Propuestas activas", "Active proposals"),
    ("navigation", "createProposal", "Crear propuesta", "Create proposal"),
    ("navigation", "voting", "Votación", "Voting"),
    ("navigation", "treasury", "Tesorería", "Treasury"),
    ("navigation", "members", "Miembros", "Members"),
    ("navigation", "participatingMembers", "Miembros participantes", "Participating members"),
    ("navigation", "history", "Historial", "History"),
    ("navigation", "analytics", "Analíticas", "Analytics"),
    ("navigation", "activity", "Actividad", "Activity"),
    ("navigation", "actions", "Acciones", "Actions"),
    ("navigation", "profile", "Perfil", "Profile"),
    ("dashboard", "title", "Panel del DAO", "DAO Dashboard"),
    ("dashboard", "balance", "Balance", "Balance"),
    ("dashboard", "connect", "Conectar wallet", "Connect wallet"),
    ("dashboard", "connecting", "Conectando...", "Connecting..."),
    ("dashboard", "disconnect", "Desconectar", "Disconnect"),
    ("dashboard", "myWallet", "Mi wallet", "My wallet"),
    ("dashboard", "notifications", "Notificaciones", "Notifications"),
    ("dashboard", "profile", "Mi perfil", "My profile"),
    ("dashboard", "search", "Buscar", "Search"),
    ("dashboard", "settings", "Configuración", "Settings"),
    ("dashboard", "treasury", "Tesorería total", "Total treasury"),
    ("dashboard", "activeProposals", "Propuestas activas", "Active proposals"),
    ("dashboard", "holders", "Poseedores de tokens", "Token holders"),
    ("dashboard", "votingPower", "Tu poder de voto", "Your voting power"),
    ("proposals", "title", "Título", "Title"),
    ("proposals", "description", "Descripción", "Description"),
    ("proposals", "amount", "Monto solicitado", "Requested amount"),
    ("proposals", "proposer", "Proponente", "Proposer"),
    ("proposals", "deadline", "Fecha límite", "Deadline"),
    ("proposals", "status", "Estado", "Status"),
    ("proposals", "votesFor", "A favor", "For"),
    ("proposals", "votesAgainst", "En contra", "Against"),
    ("proposals", "support", "Apoyo", "Support"),
    ("proposals", "voteFor", "Votar a favor", "Vote for"),
    ("proposals", "voteAgainst", "Votar en contra", "Vote against"),
    ("proposals", "alreadyVoted", "Ya votaste", "You already voted"),
    ("proposals", "empty", "No hay propuestas", "No proposals"),
    ("proposals", "created", "Propuesta creada", "Proposal created"),
    ("proposals", "executed", "Propuesta ejecutada", "Proposal executed"),
    ("governance", "tokens", "Tokens de gobernanza", "Governance tokens"),
    ("governance", "owner", "Propietario", "Owner"),
    ("governance", "votingPower", "Poder de voto", "Voting power"),
    ("governance", "votes", "Votos", "Votes"),
    ("governance", "voteRecorded", "Voto registrado", "Vote recorded"),
    ("wallet", "address", "Dirección", "Address"),
    ("wallet", "network", "Red", "Network"),
    ("wallet", "connected", "Wallet conectada", "Wallet connected"),
    ("wallet", "disconnected", "Wallet desconectada", "Wallet disconnected"),
    ("wallet", "notConnected", "No hay wallet conectada", "No wallet connected"),
];

/// Durable subset of [`LanguageStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSnapshot {
    pub language: Language,
}

#[derive(Debug, Clone, Default)]
pub struct LanguageStore {
    language: Language,
}

impl LanguageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn toggle(&mut self) -> Language {
        self.language = self.language.toggled();
        self.language
    }

    /// Translate `key`, optionally scoped to `section`.
    ///
    /// Without a section the first section containing the key wins. Unknown
    /// keys come back unchanged.
    pub fn t(&self, key: &str, section: Option<&str>) -> String {
        translate(self.language, key, section)
            .unwrap_or(key)
            .to_string()
    }
}

pub fn translate(language: Language, key: &str, section: Option<&str>) -> Option<&'static str> {
    TRANSLATIONS
        .iter()
        .find(|(s, k, _, _)| *k == key && section.map_or(true, |wanted| wanted == *s))
        .map(|(_, _, es, en)| match language {
            Language::Es => *es,
            Language::En => *en,
        })
}

impl Persist for LanguageStore {
    const KEY: &'static str = LANGUAGE_STORAGE_KEY;
    type Snapshot = LanguageSnapshot;

    fn snapshot(&self) -> LanguageSnapshot {
        LanguageSnapshot {
            language: self.language,
        }
    }

    fn restore(&mut self, snapshot: LanguageSnapshot) {
        self.language = snapshot.language;
    }
}
