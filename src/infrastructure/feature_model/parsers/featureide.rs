//! FeatureIDE XML feature model parser

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::domain::feature_model::{
    Constraint, Feature, FeatureModel, FeatureModelParser, Formula, ModelFormat, ModelInput,
    Relation, RelationKind, MAX_NESTING_DEPTH,
};
use crate::domain::DomainError;

/// Minimal owned XML element tree
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn flag(&self, key: &str) -> bool {
        self.attribute(key) == Some("true")
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Parser for FeatureIDE `.xml` models
#[derive(Debug, Clone, Default)]
pub struct FeatureIdeParser;

impl FeatureIdeParser {
    pub fn new() -> Self {
        Self
    }

    fn read_tree(input: &ModelInput) -> Result<Element, DomainError> {
        let mut reader = Reader::from_str(&input.content);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        let error = |message: String| DomainError::format(&input.source, message);
        let too_deep = || error(format!("model nesting exceeds {} levels", MAX_NESTING_DEPTH));

        loop {
            let event = reader.read_event().map_err(|e| {
                error(format!(
                    "malformed XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(_) | Event::Empty(_) if stack.len() >= MAX_NESTING_DEPTH => {
                    return Err(too_deep());
                }
                Event::Start(start) => stack.push(Self::open(&start, &input.source)?),
                Event::Empty(start) => {
                    let element = Self::open(&start, &input.source)?;
                    Self::close(element, &mut stack, &mut root);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| error("unbalanced closing tag".to_string()))?;
                    Self::close(element, &mut stack, &mut root);
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        let text = text
                            .unescape()
                            .map_err(|e| error(format!("invalid text content: {}", e)))?;
                        current.text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(error("unexpected end of document".to_string()));
        }

        root.ok_or_else(|| error("empty document".to_string()))
    }

    fn open(start: &BytesStart<'_>, source: &str) -> Result<Element, DomainError> {
        let mut element = Element {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Element::default()
        };

        for attribute in start.attributes() {
            let attribute = attribute
                .map_err(|e| DomainError::format(source, format!("invalid attribute: {}", e)))?;
            let value = attribute
                .unescape_value()
                .map_err(|e| DomainError::format(source, format!("invalid attribute: {}", e)))?;

            element.attributes.push((
                String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
                value.into_owned(),
            ));
        }

        Ok(element)
    }

    fn close(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => *root = Some(element),
        }
    }

    fn build_model(document: &Element, source: &str) -> Result<FeatureModel, DomainError> {
        if document.name != "featureModel" && document.name != "extendedFeatureModel" {
            return Err(DomainError::format(
                source,
                format!("expected <featureModel> root element, found <{}>", document.name),
            ));
        }

        let tree = document
            .child("struct")
            .ok_or_else(|| DomainError::format(source, "missing <struct> element"))?;

        let mut features = tree.children.iter().filter(|c| is_feature_element(&c.name));
        let root = features
            .next()
            .ok_or_else(|| DomainError::format(source, "<struct> contains no root feature"))?;

        if features.next().is_some() {
            return Err(DomainError::format(source, "<struct> contains more than one root feature"));
        }

        let root = Self::build_feature(root, source)?;

        let constraints = match document.child("constraints") {
            Some(constraints) => constraints
                .children
                .iter()
                .filter(|c| c.name == "rule")
                .map(|rule| Self::build_rule(rule, source))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(FeatureModel::new(root).with_constraints(constraints))
    }

    fn build_feature(element: &Element, source: &str) -> Result<Feature, DomainError> {
        let name = element
            .attribute("name")
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                DomainError::format(source, format!("<{}> element without a name", element.name))
            })?;

        let mut feature = Feature::new(name).with_abstract(element.flag("abstract"));

        let children = element
            .children
            .iter()
            .filter(|c| is_feature_element(&c.name))
            .map(|c| Ok((Self::build_feature(c, source)?, c.flag("mandatory"))))
            .collect::<Result<Vec<_>, DomainError>>()?;

        if children.is_empty() {
            return Ok(feature);
        }

        match element.name.as_str() {
            "and" => {
                for (child, mandatory) in children {
                    feature = feature.with_relation(if mandatory {
                        Relation::mandatory(child)
                    } else {
                        Relation::optional(child)
                    });
                }
            }
            "or" | "alt" => {
                let kind = if element.name == "or" {
                    RelationKind::Or
                } else {
                    RelationKind::Alternative
                };
                let children = children.into_iter().map(|(child, _)| child).collect();
                feature = feature.with_relation(Relation::group(kind, children));
            }
            _ => {
                return Err(DomainError::format(
                    source,
                    format!("leaf <feature> '{}' cannot have children", name),
                ));
            }
        }

        Ok(feature)
    }

    fn build_rule(rule: &Element, source: &str) -> Result<Constraint, DomainError> {
        let mut formulas = rule.children.iter().filter(|c| c.name != "description");

        match (formulas.next(), formulas.next()) {
            (Some(node), None) => Ok(Constraint::new(Self::build_formula(node, source, 1)?)),
            _ => Err(DomainError::format(
                source,
                "<rule> must contain exactly one formula",
            )),
        }
    }

    /// `depth` is the formula depth of `node`; folding n operands adds n - 1 levels
    fn build_formula(node: &Element, source: &str, depth: usize) -> Result<Formula, DomainError> {
        let child_depth = depth + node.children.len().max(1);
        if child_depth > MAX_NESTING_DEPTH {
            return Err(DomainError::format(
                source,
                format!("model nesting exceeds {} levels", MAX_NESTING_DEPTH),
            ));
        }

        let operands = |expected: usize| -> Result<Vec<Formula>, DomainError> {
            let operands = node
                .children
                .iter()
                .map(|c| Self::build_formula(c, source, child_depth))
                .collect::<Result<Vec<_>, _>>()?;

            if operands.len() < expected {
                return Err(DomainError::format(
                    source,
                    format!("<{}> needs at least {} operand(s)", node.name, expected),
                ));
            }

            Ok(operands)
        };

        match node.name.as_str() {
            "var" => {
                let name = node.text.trim();
                if name.is_empty() {
                    return Err(DomainError::format(source, "empty <var> in constraint"));
                }
                Ok(Formula::var(name))
            }
            "not" => {
                let mut operands = operands(1)?;
                if operands.len() != 1 {
                    return Err(DomainError::format(source, "<not> takes exactly one operand"));
                }
                Ok(Formula::not(operands.remove(0)))
            }
            "conj" => fold(operands(2)?, Formula::and),
            "disj" => fold(operands(2)?, Formula::or),
            "imp" | "eq" => {
                let mut operands = operands(2)?;
                if operands.len() != 2 {
                    return Err(DomainError::format(
                        source,
                        format!("<{}> takes exactly two operands", node.name),
                    ));
                }
                let right = operands.remove(1);
                let left = operands.remove(0);

                Ok(if node.name == "imp" {
                    Formula::implies(left, right)
                } else {
                    Formula::iff(left, right)
                })
            }
            other => Err(DomainError::format(
                source,
                format!("unsupported constraint element <{}>", other),
            )),
        }
    }
}

fn is_feature_element(name: &str) -> bool {
    matches!(name, "and" | "or" | "alt" | "feature")
}

/// Left-fold a non-empty operand list with a binary connective
fn fold(operands: Vec<Formula>, op: fn(Formula, Formula) -> Formula) -> Result<Formula, DomainError> {
    let mut operands = operands.into_iter();
    let first = operands
        .next()
        .ok_or_else(|| DomainError::internal("empty operand list"))?;

    Ok(operands.fold(first, op))
}

impl FeatureModelParser for FeatureIdeParser {
    fn format(&self) -> ModelFormat {
        ModelFormat::FeatureIde
    }

    fn parse(&self, input: &ModelInput) -> Result<FeatureModel, DomainError> {
        let document = Self::read_tree(input)?;
        Self::build_model(&document, &input.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature_model::ConstraintKind;

    const CAR: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<featureModel>
    <properties/>
    <struct>
        <and abstract="true" mandatory="true" name="Car">
            <description>A car &amp; its parts</description>
            <feature mandatory="true" name="Body"/>
            <alt abstract="true" mandatory="true" name="Engine">
                <feature name="Electric"/>
                <feature name="Gasoline"/>
            </alt>
            <or name="Extras">
                <feature name="Radio"/>
                <feature name="GPS"/>
            </or>
            <feature name="Towbar"/>
        </and>
    </struct>
    <constraints>
        <rule>
            <description>navigation needs power</description>
            <imp><var>GPS</var><var>Electric</var></imp>
        </rule>
        <rule>
            <not><conj><var>Towbar</var><var>Electric</var></conj></not>
        </rule>
        <rule>
            <disj><var>Radio</var><var>GPS</var><var>Towbar</var></disj>
        </rule>
    </constraints>
</featureModel>"#;

    fn parse(content: &str) -> Result<FeatureModel, DomainError> {
        FeatureIdeParser::new().parse(&ModelInput::new(content, "car.xml"))
    }

    #[test]
    fn test_parse_structure() {
        let model = parse(CAR).unwrap();

        assert_eq!(model.root.name, "Car");
        assert!(model.root.is_abstract);
        assert_eq!(model.root.relations.len(), 4);
        assert_eq!(model.root.relations[0].kind, RelationKind::Mandatory);
        assert_eq!(model.root.relations[3].kind, RelationKind::Optional);

        let engine = &model.root.relations[1].children[0];
        assert_eq!(engine.name, "Engine");
        assert_eq!(engine.relations[0].kind, RelationKind::Alternative);
        assert_eq!(engine.relations[0].children.len(), 2);

        let extras = &model.root.relations[2].children[0];
        assert_eq!(extras.relations[0].kind, RelationKind::Or);
        assert_eq!(model.feature_names().len(), 9);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_parse_constraints() {
        let model = parse(CAR).unwrap();
        let kinds: Vec<_> = model.constraints.iter().map(|c| c.kind()).collect();

        assert_eq!(
            kinds,
            vec![
                ConstraintKind::Requires,
                ConstraintKind::Excludes,
                ConstraintKind::Complex
            ]
        );
        assert_eq!(model.constraints[2].formula.to_string(), "(Radio | GPS) | Towbar");
    }

    #[test]
    fn test_malformed_xml_is_format_error() {
        let err = parse("<featureModel><struct><and name=\"A\">").unwrap_err();

        match err {
            DomainError::Format { path, .. } => assert_eq!(path, "car.xml"),
            other => panic!("unexpected {:?}", other),
        }
    }

    fn nested_features(depth: usize) -> String {
        let mut xml = String::from("<featureModel><struct>");
        for level in 0..depth {
            xml.push_str(&format!("<and name=\"F{}\">", level));
        }
        xml.push_str("<feature name=\"Leaf\"/>");
        for _ in 0..depth {
            xml.push_str("</and>");
        }
        xml.push_str("</struct></featureModel>");
        xml
    }

    #[test]
    fn test_deep_feature_tree_is_rejected() {
        let err = parse(&nested_features(MAX_NESTING_DEPTH + 10)).unwrap_err();

        match err {
            DomainError::Format { path, message } => {
                assert_eq!(path, "car.xml");
                assert!(message.contains("nesting exceeds"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_moderately_deep_feature_tree_parses() {
        let model = parse(&nested_features(50)).unwrap();
        assert_eq!(model.feature_names().len(), 51);
    }

    #[test]
    fn test_deep_constraint_is_rejected() {
        let mut formula = "<var>A</var>".to_string();
        for _ in 0..MAX_NESTING_DEPTH {
            formula = format!("<not>{}</not>", formula);
        }
        let xml = format!(
            "<featureModel><struct><feature name=\"A\"/></struct><constraints><rule>{}</rule></constraints></featureModel>",
            formula
        );

        let err = parse(&xml).unwrap_err();
        assert!(err.to_string().contains("nesting exceeds"));
    }

    #[test]
    fn test_wide_disjunction_is_rejected() {
        let vars = "<var>A</var>".repeat(MAX_NESTING_DEPTH + 1);
        let xml = format!(
            "<featureModel><struct><feature name=\"A\"/></struct><constraints><rule><disj>{}</disj></rule></constraints></featureModel>",
            vars
        );

        let err = parse(&xml).unwrap_err();
        assert!(err.to_string().contains("nesting exceeds"));
    }

    #[test]
    fn test_wrong_root_element() {
        let err = parse("<project><struct/></project>").unwrap_err();
        assert!(err.to_string().contains("<featureModel>"));
    }

    #[test]
    fn test_missing_struct() {
        assert!(parse("<featureModel><constraints/></featureModel>").is_err());
    }

    #[test]
    fn test_unknown_constraint_element() {
        let xml = r#"<featureModel><struct><feature name="A"/></struct>
            <constraints><rule><xor><var>A</var><var>A</var></xor></rule></constraints>
            </featureModel>"#;

        let err = parse(xml).unwrap_err();
        assert!(err.to_string().contains("<xor>"));
    }
}
