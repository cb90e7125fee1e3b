pub(crate) const PROMPT_VERSION: &str = "v2";

pub(crate) fn build_system_prompt() -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are an experienced quality testing specialist for FHIR resources and for \
         HL7 ADT / CCDA to FHIR transformations. Generate complete test cases for the \
         attribute-level mappings in the supplied mapping CSV, covering positive, negative \
         and edge scenarios for every mapping line.\n\n",
    );

    prompt.push_str("Output requirements:\n");
    prompt.push_str("- Output only a JSON object, starting with '{' and ending with '}'.\n");
    prompt.push_str("- No markdown, no code fences, no comments, no explanations.\n");
    prompt.push_str(
        "- The object has a TestCases array and a StatisticalSummary object.\n",
    );
    prompt.push_str(
        "- Every test case has TestCaseID, TestDescription, ExpectedOutput, TestSteps (array of strings), PassFailCriteria, TestCaseType and Subtype.\n",
    );
    prompt.push_str(
        "- TestCaseID follows B_<batch>_TC_<nnn>_<type>_<subtype>, using the batch number given in the request.\n",
    );
    prompt.push_str("- TestCaseType is one of FUNCTIONAL, REGRESSION, EDGE.\n");
    prompt.push_str("- Subtype is one of POSITIVE, NEGATIVE.\n");
    prompt.push_str(
        "- StatisticalSummary carries TotalTestCases, MappingRows, UniqueAttributes, TestCaseTypeBreakdown and SubtypeBreakdown.\n\n",
    );

    prompt.push_str("Coverage:\n");
    prompt.push_str(
        "1. Functional: successful transformation of mandatory and optional fields, conditional updates, data integrity between source message and FHIR resource.\n",
    );
    prompt.push_str(
        "2. Regression: existing behaviour unaffected, backward compatibility with earlier message formats, previously fixed failures.\n",
    );
    prompt.push_str(
        "3. Edge: malformed input, missing mandatory fields, wrong data types, boundary values, special and Unicode characters, null optionals, duplicate identifiers.\n",
    );
    prompt.push_str("Do not use placeholders; write every test case in full.");
    prompt
}

pub(crate) fn build_user_prompt(csv_mapping: &str, batch_number: &str) -> String {
    format!(
        "Generate functional, regression, and edge test cases for the mapping CSV file that covers every possible attribute.\n\n\
Current batch number: {batch}\n\n\
Please find the mapping CSV file below:\n\
{mapping}\n\n\
Generate comprehensive test cases covering:\n\
- Functional test cases (positive and negative)\n\
- Regression test cases\n\
- Edge test cases\n\n\
Output format: JSON with TestCases array and StatisticalSummary object.\n\
TestCaseID format: B_{batch}_TC_001_functional_positive\n\
Include TestCaseID, TestDescription, ExpectedOutput, TestSteps, and PassFailCriteria for each test case.\n\n\
IMPORTANT: Output only pure JSON without any markdown formatting or code blocks.",
        batch = batch_number,
        mapping = csv_mapping.trim(),
    )
}
