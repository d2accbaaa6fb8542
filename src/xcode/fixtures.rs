pub const SAMPLE_APP: &str =
    include_str!("../../tests/fixtures/SampleApp/ios/SampleApp.xcodeproj/project.pbxproj");

pub const REACT_PROJECT: &str = include_str!(
    "../../tests/fixtures/SampleApp/node_modules/react-native/React/React.xcodeproj/project.pbxproj"
);
