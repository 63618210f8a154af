//! System instructions for README summaries, by locale

/// Instruction used when no locale matches
pub const DEFAULT_INSTRUCTION: &str = "You are a technical analyst specializing in analyzing GitHub repositories. Provide a concise but comprehensive summary of the repository based on its README content. Focus on the key features, purpose, and technical aspects.";

const ZH_HANS: &str = "你是一个专门分析GitHub仓库的技术分析师。基于README内容提供简洁而全面的仓库总结。请用中文回答，重点关注主要功能、用途和技术方面。";

const ZH_HANT: &str = "你是一個專門分析GitHub儲存庫的技術分析師。基於README內容提供簡潔而全面的儲存庫總結。請用繁體中文回答，重點關注主要功能、用途和技術方面。";

/// Lower-cased locale tag → instruction
const INSTRUCTIONS: &[(&str, &str)] = &[
    ("zh", ZH_HANS),
    ("zh-cn", ZH_HANS),
    ("zh-tw", ZH_HANT),
    ("ja", "あなたはGitHubリポジトリの分析を専門とする技術アナリストです。READMEの内容に基づいて、簡潔で包括的なリポジトリの要約を提供してください。日本語で回答し、主要な機能、目的、技術的側面に焦点を当ててください。"),
    ("ko", "당신은 GitHub 리포지토리 분석을 전문으로 하는 기술 분석가입니다. README 내용을 바탕으로 간결하면서도 포괄적인 리포지토리 요약을 제공해주세요. 한국어로 답변하시고, 주요 기능, 목적, 기술적 측면에 중점을 두세요."),
    ("es", "Eres un analista técnico especializado en analizar repositorios de GitHub. Proporciona un resumen conciso pero completo del repositorio basado en el contenido del README. Responde en español, enfócate en las características clave, el propósito y los aspectos técnicos."),
    ("fr", "Vous êtes un analyste technique spécialisé dans l'analyse des dépôts GitHub. Fournissez un résumé concis mais complet du dépôt basé sur le contenu du README. Répondez en français, en vous concentrant sur les fonctionnalités clés, l'objectif et les aspects techniques."),
    ("de", "Sie sind ein technischer Analyst, der sich auf die Analyse von GitHub-Repositories spezialisiert hat. Geben Sie eine prägnante, aber umfassende Zusammenfassung des Repositories basierend auf dem README-Inhalt. Antworten Sie auf Deutsch und konzentrieren Sie sich auf die wichtigsten Funktionen, den Zweck und die technischen Aspekte."),
    ("ru", "Вы технический аналитик, специализирующийся на анализе GitHub репозиториев. Предоставьте краткое, но всестороннее резюме репозитория на основе содержимого README. Отвечайте на русском языке, сосредоточьтесь на ключевых функциях, назначении и технических аспектах."),
    ("pt", "Você é um analista técnico especializado em analisar repositórios do GitHub. Forneça um resumo conciso, mas abrangente do repositório baseado no conteúdo do README. Responda em português, focando nas principais funcionalidades, propósito e aspectos técnicos."),
    ("it", "Sei un analista tecnico specializzato nell'analisi dei repository GitHub. Fornisci un riassunto conciso ma completo del repository basato sul contenuto del README. Rispondi in italiano, concentrandoti sulle caratteristiche principali, lo scopo e gli aspetti tecnici."),
];

fn lookup(tag: &str) -> Option<&'static str> {
    INSTRUCTIONS
        .iter()
        .find(|(key, _)| *key == tag)
        .map(|(_, instruction)| *instruction)
}

/// Pick the system instruction for a locale tag: full tag first, then the
/// two-letter language prefix, then English.
pub fn system_instruction(locale: &str) -> &'static str {
    let tag = locale.trim().replace('_', "-").to_lowercase();

    lookup(&tag)
        .or_else(|| tag.get(..2).and_then(lookup))
        .unwrap_or(DEFAULT_INSTRUCTION)
}

/// First language tag of an `Accept-Language` header value
pub fn preferred_locale(accept_language: &str) -> Option<String> {
    accept_language
        .split(',')
        .map(|part| part.split(';').next().unwrap_or("").trim())
        .find(|tag| !tag.is_empty() && *tag != "*")
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_tag_wins_over_prefix() {
        assert_eq!(system_instruction("zh-TW"), ZH_HANT);
        assert_eq!(system_instruction("zh_CN"), ZH_HANS);
    }

    #[test]
    fn prefix_fallback() {
        assert!(system_instruction("fr-CA").contains("en français"));
        assert_eq!(system_instruction("zh-HK"), ZH_HANS);
    }

    #[test]
    fn unknown_locale_is_english() {
        assert_eq!(system_instruction("nl-NL"), DEFAULT_INSTRUCTION);
        assert_eq!(system_instruction("en-US"), DEFAULT_INSTRUCTION);
        assert_eq!(system_instruction(""), DEFAULT_INSTRUCTION);
        assert_eq!(system_instruction("x"), DEFAULT_INSTRUCTION);
    }

    #[test]
    fn accept_language_first_tag() {
        assert_eq!(
            preferred_locale("de-DE,de;q=0.9,en;q=0.8").as_deref(),
            Some("de-DE")
        );
        assert_eq!(preferred_locale("*").as_deref(), None);
        assert_eq!(preferred_locale("").as_deref(), None);
    }
}
