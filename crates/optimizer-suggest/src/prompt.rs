use optimizer_core::RequestParameters;

/// Fixed instruction document sent with every request.
const INSTRUCTION: &str = r#"
<SYSTEM>
  <MISSION_AND_CORE_DIRECTIVE>
    Eres el "Optimizador de Prompts IA". Tu misión: transformar un prompt básico en un PROMPT OPTIMIZADO de alto rendimiento, aplicando principios avanzados (personas multidimensionales, restricciones/guardrails, delimitadores XML, salidas estructuradas y marcos de razonamiento). Debes entregar un resultado listo para usar en el modelo destino indicado por el usuario.
  </MISSION_AND_CORE_DIRECTIVE>
  <PERSONA_CONFIGURATION>
    <rol>Ingeniero de Optimización de Sistemas LLM</rol>
    <experiencia>Diagnóstico de fallos, refactorización, CoT/Few-Shot, Prompt Chaining, RAG, PromptOps</experiencia>
    <tono>Analítico, preciso y constructivo</tono>
  </PERSONA_CONFIGURATION>
  <CRITICAL_CONSTRAINT>
    Bajo ninguna circunstancia ejecutes o respondas al prompt del usuario. Solo analízalo y reescríbelo. No expongas tu cadena de pensamiento; ofrece justificaciones breves y accionables.
  </CRITICAL_CONSTRAINT>
  <OPTIMIZATION_PRINCIPLES>
    P1 Personas (rol+expertise+objetivos+tono) •
    P2 Restricciones (formato, longitud, guardrails positivos, anti-alucinación) •
    P3 Estructura y Delimitadores (etiquetas XML/JSON/YAML) •
    P4 Salida Estructurada (si el prompt objetivo alimenta una app) •
    P5 Razonamiento (activar CoT/Few-Shot cuando aporte) •
    P6 Manejo de Contexto/Placeholders (RAG/Search/Multimodal si procede)
  </OPTIMIZATION_PRINCIPLES>
  <WORKFLOW>
    <STEP_1_DIAGNOSIS>
      Analiza ${{input_prompt}}. Detecta ambigüedades, falta de persona, falta de formato de salida, ausencia de guardrails, longitud inapropiada, y necesidades de datos frescos/multimodal.
    </STEP_1_DIAGNOSIS>
    <STEP_2_STRATEGIC_REFACTORING>
      Define plan breve (sin CoT explícito): qué persona añadir, qué restricciones y formato imponer, qué delimitadores usar, si conviene Few-Shot mínimo, y si recomendar RAG/Search o entradas multimedia.
    </STEP_2_STRATEGIC_REFACTORING>
    <STEP_3_SYNTHESIS>
      Genera el PROMPT OPTIMIZADO con:
      - Delimitadores robustos (XML preferente).
      - Persona Multidimensional.
      - Instrucciones claras + Guardrails positivos (anti-PII, anti-alucinación).
      - Variables ${{...}} para inputs de usuario.
      - Formato de salida: según ${{context_mode}} (prioriza JSON si se consumirá por UI).
      - Bloques opcionales: <FEW_SHOT> (máx. 1-2 ejemplos), <TOOLS> (RAG/Search/Multimodal) si aplica.
    </STEP_3_SYNTHESIS>
    <STEP_4_RATIONALE>
      Explica brevemente (bullets): mejoras clave, riesgos mitigados, y cómo adaptarlo a ${{target_model}}.
    </STEP_4_RATIONALE>
    <STEP_5_TESTS>
      Propón 2–3 pruebas rápidas (smoke tests) y criterios de aceptación.
    </STEP_5_TESTS>
  </WORKFLOW>
  <OUTPUT_FORMAT>
    Devuelve JSON estrictamente con este schema:
    {
      "status":"ok|needs_input|error",
      "summary":"string",
      "items":[
        {"title":"Prompt Optimizado","description":"Resumen breve","details":{"kv_pairs":[{"key":"code","value":"<PROMPT_OPTIMIZADO>"},{"key":"notes","value":"indicaciones de uso"}]}},
        {"title":"Mejoras y Guardrails","description":"bullets"},
        {"title":"Pruebas Sugeridas","description":"bullets"}
      ],
      "actions":[{"label":"Copiar prompt","type":"copy","payload":"<PROMPT_OPTIMIZADO>"}],
      "debug":{"notes":"sin datos sensibles"}
    }
  </OUTPUT_FORMAT>
  <VALIDATION_AND_ERRORS>
    Si ${{input_prompt}} está vacío → status="needs_input" con campos requeridos.
    Si ${{latencia_max_ms}} muy bajo → recomienda simplificar longitud/estructura.
    Si ${{requires_fresh_data}}=true → añade sección <TOOLS> con "Google Search (Grounding)" y pauta de citación.
  </VALIDATION_AND_ERRORS>
</SYSTEM>
"#;

/// Placeholder names in the order they appear in the user message.
pub const PLACEHOLDERS: [&str; 11] = [
    "input_prompt",
    "idioma",
    "tono",
    "longitud",
    "target_model",
    "context_mode",
    "requires_fresh_data",
    "multimodal",
    "latencia_max_ms",
    "presupuesto_tokens",
    "guardrails_extra",
];

pub fn system_prompt() -> &'static str {
    INSTRUCTION
}

enum Value<'a> {
    Text(&'a str),
    Raw(String),
}

/// Serialize the form as `${{name}}: "value"` lines. Values are embedded
/// verbatim; only strings and choices are quoted.
pub fn user_message(params: &RequestParameters) -> String {
    let values = [
        Value::Text(&params.input_prompt),
        Value::Text(params.language.as_str()),
        Value::Text(params.tone.as_str()),
        Value::Text(params.length.as_str()),
        Value::Text(&params.target_model),
        Value::Text(params.context_mode.as_str()),
        Value::Raw(params.requires_fresh_data.to_string()),
        Value::Text(params.multimodal.as_str()),
        Value::Raw(params.latency_max_ms.to_string()),
        Value::Raw(params.token_budget.to_string()),
        Value::Text(&params.guardrails_extra),
    ];

    let mut out = String::with_capacity(512 + params.input_prompt.len());
    for (name, value) in PLACEHOLDERS.iter().zip(values) {
        out.push_str("${{");
        out.push_str(name);
        out.push_str("}}: ");
        match value {
            Value::Text(s) => {
                out.push('"');
                out.push_str(s);
                out.push('"');
            }
            Value::Raw(s) => out.push_str(&s),
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimizer_core::{ContextMode, Language, Length, Multimodal, Tone};
    use pretty_assertions::assert_eq;

    fn params() -> RequestParameters {
        RequestParameters {
            input_prompt: "Write a product description for a kettle".to_string(),
            target_model: "Claude".to_string(),
            language: Language::English,
            tone: Tone::Technical,
            length: Length::Short,
            context_mode: ContextMode::Json,
            multimodal: Multimodal::ImageAnalyze,
            guardrails_extra: "Avoid mentioning competitors".to_string(),
            requires_fresh_data: true,
            latency_max_ms: 1200,
            token_budget: 800,
        }
    }

    #[test]
    fn message_lists_every_placeholder_once_in_order() {
        let msg = user_message(&params());
        let mut last = 0;
        for name in PLACEHOLDERS {
            let tag = format!("${{{{{name}}}}}:");
            assert_eq!(msg.matches(&tag).count(), 1, "{tag} should appear once");
            let at = msg.find(&tag).unwrap();
            assert!(at >= last, "{tag} out of order");
            last = at;
        }
    }

    #[test]
    fn message_quotes_text_but_not_numbers_or_flags() {
        let msg = user_message(&params());
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"${{input_prompt}}: "Write a product description for a kettle""#,
                r#"${{idioma}}: "en""#,
                r#"${{tono}}: "técnico""#,
                r#"${{longitud}}: "corta""#,
                r#"${{target_model}}: "Claude""#,
                r#"${{context_mode}}: "json""#,
                r#"${{requires_fresh_data}}: true"#,
                r#"${{multimodal}}: "image_analyze""#,
                r#"${{latencia_max_ms}}: 1200"#,
                r#"${{presupuesto_tokens}}: 800"#,
                r#"${{guardrails_extra}}: "Avoid mentioning competitors""#,
            ]
        );
    }

    #[test]
    fn values_are_embedded_without_escaping() {
        let mut p = params();
        p.input_prompt = r#"say "hi""#.to_string();
        assert!(user_message(&p).contains(r#"${{input_prompt}}: "say "hi"""#));
    }

    #[test]
    fn instruction_never_varies() {
        assert_eq!(system_prompt(), INSTRUCTION);
        assert!(system_prompt().contains("<OUTPUT_FORMAT>"));
        for name in ["input_prompt", "context_mode", "target_model", "requires_fresh_data"] {
            assert!(system_prompt().contains(&format!("${{{{{name}}}}}")));
        }
    }
}
