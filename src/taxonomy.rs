//! Curated niche keyword taxonomy and the list of region codes (UFs).
//!
//! These tables are fixed at compile time and never mutated.

use serde::Serialize;

/// Niche id that disables keyword filtering.
pub const ALL_NICHES: &str = "todos";

/// A curated category of service offerings.
#[derive(Debug, Clone, Copy)]
pub struct Niche {
    pub id: &'static str,
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

pub static NICHES: &[Niche] = &[
    Niche {
        id: "pesquisa",
        label: "Pesquisa e Diagnóstico",
        keywords: &[
            "pesquisa",
            "diagnóstico",
            "mapeamento",
            "estudo",
            "avaliação",
            "censo",
            "relatório",
            "levantamento de dados",
            "análise de dados",
            "monitoramento",
            "estudo de impacto",
            "EIA",
            "RIMA",
            "análise de vulnerabilidade",
            "viabilidade socioambiental",
            "indicadores sociais",
        ],
    },
    Niche {
        id: "treinamento",
        label: "Treinamento e Capacitação",
        keywords: &[
            "formação",
            "capacitação",
            "treinamento",
            "oficina",
            "curso",
            "workshop",
            "desenvolvimento profissional",
            "educação ambiental",
            "palestra",
            "seminário",
            "qualificação profissional",
        ],
    },
    Niche {
        id: "consultoria",
        label: "Consultoria e Serviços Técnicos",
        keywords: &[
            "consultoria",
            "assessoria",
            "apoio técnico",
            "suporte técnico",
            "plano de gestão",
            "licenciamento ambiental",
            "gestão de projetos",
            "facilitação",
            "mediação de conflitos",
            "plano diretor",
            "regularização fundiária",
        ],
    },
    Niche {
        id: "edicao",
        label: "Edição e Publicação",
        keywords: &[
            "edital de publicação",
            "livros",
            "cartilhas",
            "material didático",
            "editoração",
            "revisão de texto",
            "produção de conteúdo",
            "comunicação social",
        ],
    },
    Niche {
        id: "ciencias_sociais",
        label: "Ciências Sociais e Humanas",
        keywords: &[
            "ciências sociais",
            "humanas",
            "antropologia",
            "sociologia",
            "desenvolvimento social",
            "projetos sociais",
            "inclusão social",
            "diversidade",
            "equidade",
            "geração de renda",
            "economia solidária",
        ],
    },
    Niche {
        id: "psicologia",
        label: "Psicologia e Apoio Psicossocial",
        keywords: &[
            "saúde mental",
            "psicologia",
            "psicossocial",
            "acolhimento",
            "atendimento a vulneráveis",
            "suporte a migrantes",
            "migrante",
            "imigrante",
            "refugiado",
            "população de rua",
            "direitos humanos",
            "violência de gênero",
            "apoio a vítimas",
            "criança e adolescente",
            "ECA",
        ],
    },
];

/// Brazilian federative units, in display order.
pub static REGION_CODES: &[&str] = &[
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

/// Look up a niche by id. The catch-all ids are not niches.
pub fn niche(id: &str) -> Option<&'static Niche> {
    NICHES.iter().find(|n| n.id == id)
}

/// Keywords for a niche id; empty for "todos", "all" and unknown ids.
pub fn keywords(id: &str) -> &'static [&'static str] {
    if is_catch_all(id) {
        return &[];
    }
    niche(id).map(|n| n.keywords).unwrap_or(&[])
}

pub fn is_catch_all(id: &str) -> bool {
    id == ALL_NICHES || id == "all"
}

/// Informational only: queries are never rejected on this.
pub fn is_known_region(code: &str) -> bool {
    REGION_CODES.contains(&code)
}

#[derive(Debug, Clone, Serialize)]
pub struct NicheEntry {
    pub id: &'static str,
    pub label: &'static str,
}

/// Selectable niches and regions, as offered to callers
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub niches: Vec<NicheEntry>,
    pub regions: Vec<&'static str>,
}

pub fn catalog() -> Catalog {
    let mut niches = vec![NicheEntry {
        id: ALL_NICHES,
        label: "Todos os Nichos",
    }];
    niches.extend(NICHES.iter().map(|n| NicheEntry {
        id: n.id,
        label: n.label,
    }));

    Catalog {
        niches,
        regions: REGION_CODES.to_vec(),
    }
}
