use nucleo::engine::model::BusinessStatus;
use nucleo::engine::parser::{
    NOT_AVAILABLE, ParsedAnalysis, SectionKey, classify_status, extract_summary,
    parse_chart_data, split_sections,
};

const BUSINESS_RESPONSE: &str = "\
### STATUS GERAL
**Atenção Moderada**
A margem está apertada e a folha pesa no resultado.

### NÚMERO ÚNICO DE FOCO
Margem Bruta: 38%

### DASHBOARD RESUMIDO
- Faturamento: R$ 50.000,00
- Lucro Bruto: R$ 19.000,00
- Folha: R$ 12.000,00
[DATASET: 01/03(F:50000, L:19000, C:31000); 15/03(F:52000, L:20500.5, C:31500); 31/03(F:49000, L:18000)]

### LEITURA INTELIGENTE (INTERPRETAÇÃO DO GRÁFICO)
A linha de evolução ficou estável.
O ponto mínimo subiu no meio do mês.

### PRINCIPAIS GARGALOS
- Folha alta
- Insumos caros

### AÇÕES RECOMENDADAS
- Renegociar fornecedores

### ALERTA OU OPORTUNIDADE
Há espaço para reajuste de preço.

### MELHORIA DO FLUXO FINANCEIRO
Separar conta pessoal da empresa.

### GARGALOS IDENTIFICADOS
- Folha de Pagamento | Onde: 24% do faturamento | Por quê: equipe ociosa à tarde | Risco: alto
- Insumos | Detalhe sem rótulo

### AÇÕES PRIORITÁRIAS
1. Revisar escala | Objetivo: reduzir horas ociosas | Impacto: R$ 2.000/mês
2. Cotar fornecedores | Objetivo: baixar CMV
Linha solta que não é ação

### PERGUNTA GUIADA
Você sabe quanto custa cada hora aberta?
";

const PERSONAL_RESPONSE: &str = "\
### STATUS FINANCEIRO
Confortável
Você fecha o mês com sobra.

### NÚMERO ÚNICO DE FOCO
Sobra Real: R$ 1.200,00

### RESUMO DO MÊS
- Renda Total: R$ 6.000,00
- Sobra Real: R$ 1.200,00

### ONDE ESTÁ O DESPERDÍCIO (GARGALOS PESSOAIS)
- Delivery | Onde: refeições fora | Por quê: falta de planejamento

### DICA DE OURO
Automatize a reserva no dia do pagamento.
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_heading_with_section() {
        let sections = split_sections("intro\n### A\nx\n### B\ny\n");
        assert_eq!(sections, vec!["intro\n", "### A\nx\n", "### B\ny\n"]);
    }

    #[test]
    fn test_split_drops_blank_sections() {
        let sections = split_sections("   \n### A\nx\n");
        assert_eq!(sections, vec!["### A\nx\n"]);
    }

    #[test]
    fn test_split_requires_whitespace_after_marker() {
        let sections = split_sections("### A\n###B still A\n");
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn test_sections_are_mapped_by_keyword() {
        let parsed = ParsedAnalysis::parse(BUSINESS_RESPONSE);
        for key in [
            SectionKey::Status,
            SectionKey::Focus,
            SectionKey::Dashboard,
            SectionKey::Reading,
            SectionKey::SimpleBottlenecks,
            SectionKey::SimpleActions,
            SectionKey::Alert,
            SectionKey::Flow,
            SectionKey::DetailedBottlenecks,
            SectionKey::DetailedActions,
            SectionKey::Question,
        ] {
            assert!(parsed.section(key).is_some(), "missing {key:?}");
        }
    }

    #[test]
    fn test_later_section_overwrites_earlier() {
        let text = "### PERGUNTA GUIADA\nprimeira\n### PERGUNTA GUIADA\nsegunda\n";
        let parsed = ParsedAnalysis::parse(text);
        assert_eq!(
            parsed.section_body(SectionKey::Question).as_deref(),
            Some("segunda")
        );
    }

    #[test]
    fn test_status_header_and_classification() {
        let parsed = ParsedAnalysis::parse(BUSINESS_RESPONSE);
        let status = parsed.status();
        // Bold markers are stripped before parsing.
        assert_eq!(status.label, "Atenção Moderada");
        assert_eq!(
            status.description,
            "A margem está apertada e a folha pesa no resultado."
        );
        assert_eq!(status.status, BusinessStatus::Attention);

        let personal = ParsedAnalysis::parse(PERSONAL_RESPONSE).status();
        assert_eq!(personal.status, BusinessStatus::Healthy);
    }

    #[test]
    fn test_classify_status_words() {
        assert_eq!(classify_status("Negócio Saudável"), BusinessStatus::Healthy);
        assert_eq!(classify_status("Equilibrado"), BusinessStatus::Healthy);
        assert_eq!(classify_status("Em Risco"), BusinessStatus::Risk);
        assert_eq!(classify_status("Estado Crítico"), BusinessStatus::Risk);
        assert_eq!(classify_status("Atenção"), BusinessStatus::Attention);
        assert_eq!(classify_status(""), BusinessStatus::Attention);
    }

    #[test]
    fn test_missing_status_section_is_attention() {
        let status = ParsedAnalysis::parse("nada estruturado").status();
        assert_eq!(status.label, "");
        assert_eq!(status.description, "");
        assert_eq!(status.status, BusinessStatus::Attention);
    }

    #[test]
    fn test_focus_metric() {
        let focus = ParsedAnalysis::parse(BUSINESS_RESPONSE).focus();
        assert_eq!(focus.label, "Margem Bruta");
        assert_eq!(focus.value, "38%");
    }

    #[test]
    fn test_focus_without_colon_uses_whole_line() {
        let focus = ParsedAnalysis::parse("### NÚMERO ÚNICO DE FOCO\n42%\n").focus();
        assert_eq!(focus.label, "42%");
        assert_eq!(focus.value, "42%");

        let focus = ParsedAnalysis::parse("### NÚMERO ÚNICO DE FOCO\n: 42%\n").focus();
        assert_eq!(focus.label, "Foco");
        assert_eq!(focus.value, "42%");
    }

    #[test]
    fn test_kpis_skip_dataset_line() {
        let kpis = ParsedAnalysis::parse(BUSINESS_RESPONSE).kpis();
        let pairs: Vec<(&str, &str)> = kpis
            .iter()
            .map(|k| (k.label.as_str(), k.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Faturamento", "R$ 50.000,00"),
                ("Lucro Bruto", "R$ 19.000,00"),
                ("Folha", "R$ 12.000,00"),
            ]
        );
    }

    #[test]
    fn test_chart_dataset() {
        let parsed = ParsedAnalysis::parse(BUSINESS_RESPONSE);
        let chart = parsed.chart().expect("dataset present");
        assert_eq!(chart.len(), 3);
        assert_eq!(chart[0].name, "01/03");
        assert_eq!(chart[0].revenue, 50000.0);
        assert_eq!(chart[0].profitability, 19000.0);
        assert_eq!(chart[0].costs, 31000.0);
        assert_eq!(chart[1].profitability, 20500.5);
        // Missing series default to zero.
        assert_eq!(chart[2].costs, 0.0);
    }

    #[test]
    fn test_no_dataset_means_no_chart() {
        assert!(parse_chart_data("### DASHBOARD RESUMIDO\n- A: 1\n").is_none());
        assert!(ParsedAnalysis::parse(PERSONAL_RESPONSE).chart().is_none());
    }

    #[test]
    fn test_section_body_strips_heading() {
        let parsed = ParsedAnalysis::parse(BUSINESS_RESPONSE);
        assert_eq!(
            parsed.section_body(SectionKey::Reading).as_deref(),
            Some("A linha de evolução ficou estável.\nO ponto mínimo subiu no meio do mês.")
        );
        assert_eq!(parsed.section_body(SectionKey::Flow).as_deref(), Some("Separar conta pessoal da empresa."));
    }

    #[test]
    fn test_detailed_bottlenecks() {
        let items = ParsedAnalysis::parse(BUSINESS_RESPONSE).bottlenecks();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Folha de Pagamento");
        assert_eq!(items[0].detail.as_deref(), Some("24% do faturamento"));
        assert_eq!(items[0].reason.as_deref(), Some("equipe ociosa à tarde"));
        assert_eq!(items[0].risk.as_deref(), Some("alto"));
        assert_eq!(items[1].name, "Insumos");
        assert_eq!(items[1].detail.as_deref(), Some("Detalhe sem rótulo"));
        assert_eq!(items[1].reason, None);
    }

    #[test]
    fn test_personal_bottlenecks_use_waste_section() {
        let items = ParsedAnalysis::parse(PERSONAL_RESPONSE).bottlenecks();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Delivery");
    }

    #[test]
    fn test_detailed_actions() {
        let actions = ParsedAnalysis::parse(BUSINESS_RESPONSE).actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].title, "Revisar escala");
        assert_eq!(actions[0].objective.as_deref(), Some("reduzir horas ociosas"));
        assert_eq!(actions[0].impact.as_deref(), Some("R$ 2.000/mês"));
        assert_eq!(actions[1].title, "Cotar fornecedores");
        assert_eq!(actions[1].impact, None);
    }

    #[test]
    fn test_summary_business() {
        let summary = extract_summary(BUSINESS_RESPONSE);
        assert_eq!(summary.faturamento, "R$ 50.000,00");
        assert_eq!(summary.lucro_bruto, "R$ 19.000,00");
    }

    #[test]
    fn test_summary_personal_fallbacks() {
        let summary = extract_summary(PERSONAL_RESPONSE);
        assert_eq!(summary.faturamento, "R$ 6.000,00");
        assert_eq!(summary.lucro_bruto, "R$ 1.200,00");
    }

    #[test]
    fn test_summary_missing_fields() {
        let summary = extract_summary("sem números aqui");
        assert_eq!(summary.faturamento, NOT_AVAILABLE);
        assert_eq!(summary.lucro_bruto, NOT_AVAILABLE);
    }
}
